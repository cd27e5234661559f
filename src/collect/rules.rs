//! Snapshot extraction rules.
//!
//! Everything here is a pure function over an HTML snapshot and a piece of
//! the site profile, so extraction is testable without a browser.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use scraper::{ElementRef, Html};
use url::Url;

use crate::app::{canonical_url, fill_template, path_tail};
use crate::config::LINE_DELIMITER;
use crate::models::Row;
use crate::site::{
    CardField, DetailSpec, FieldSource, ItemIdentity, LabelRule, LabelTable, ListingSpec,
    PairStyle, StatusPricing, TextField, TextMode, TextScope,
};
use crate::utils::{node_lines, node_text, normalize_label, remove_whitespace, select_all};

/// A card read from the listing snapshot, before it gets a sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSnapshot {
    pub detail_url: String,
    pub code: String,
    pub card: Row,
}

/// Turns a card link into `(canonical detail URL, item code)`.
#[derive(Debug, Clone)]
pub struct ItemResolver {
    base: Url,
    identity: ItemIdentity,
    pattern: Option<Regex>,
}

impl ItemResolver {
    /// # Errors
    ///
    /// Fails if the base URL or the identity pattern is invalid.
    pub fn new(base_url: &str, identity: ItemIdentity) -> Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("invalid base URL {base_url}"))?;
        let pattern = match identity {
            ItemIdentity::Pattern { pattern, .. } => Some(
                Regex::new(pattern).with_context(|| format!("invalid item pattern {pattern}"))?,
            ),
            ItemIdentity::PathTail { .. } => None,
        };
        Ok(Self {
            base,
            identity,
            pattern,
        })
    }

    /// Returns `None` for links that are not item links, including the
    /// listing root itself.
    pub fn resolve(&self, href: &str) -> Option<(String, String)> {
        match (&self.identity, &self.pattern) {
            (ItemIdentity::PathTail { href_prefix }, _) => {
                let url = canonical_url(&self.base, href)?;
                let rest = url.path().strip_prefix(href_prefix)?;
                if rest.trim_matches('/').is_empty() {
                    return None;
                }
                let code = path_tail(&url)?;
                Some((url.to_string(), code))
            }
            (ItemIdentity::Pattern { detail_url, .. }, Some(re)) => {
                let id = re.captures(href)?.get(1)?.as_str().trim();
                if id.is_empty() {
                    return None;
                }
                Some((fill_template(detail_url, id), id.to_string()))
            }
            (ItemIdentity::Pattern { .. }, None) => None,
        }
    }
}

fn field_value(card: ElementRef<'_>, selector: &str, source: FieldSource) -> String {
    let matches = select_all(card, selector);
    let text = match source {
        FieldSource::Text => matches.first().map(|e| node_text(*e)),
        FieldSource::Nth(n) => matches.get(n).map(|e| node_text(*e)),
        FieldSource::SplitPart { separator, index } => matches.first().and_then(|e| {
            node_text(*e)
                .split(separator)
                .nth(index)
                .map(|p| p.trim().to_string())
        }),
        FieldSource::Present(value) => matches.first().map(|_| value.to_string()),
    };
    text.unwrap_or_default()
}

/// Reads the profile's card fields from one card element.
///
/// Each field takes the first non-empty result over its selectors, falling
/// back to the field default. Absent elements are never an error.
pub fn extract_card(card: ElementRef<'_>, fields: &[CardField]) -> Row {
    fields
        .iter()
        .map(|field| {
            let value = field
                .selectors
                .iter()
                .map(|s| field_value(card, s, field.source))
                .find(|v| !v.is_empty())
                .unwrap_or_else(|| field.default.to_string());
            (field.column.to_string(), value)
        })
        .collect()
}

/// Rewrites the price columns of a card from its sale status.
///
/// A live price gets the suffix and a missing discount becomes the
/// no-discount value; fixed statuses overwrite both columns; anything else
/// is unknown.
pub fn apply_pricing(pricing: &StatusPricing, card: &mut Row) {
    let status = card
        .get(pricing.status)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    let (price, discount) = if pricing.on_sale.contains(&status.as_str()) {
        let price = card
            .get(pricing.price)
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(|p| format!("{p}{}", pricing.price_suffix))
            .unwrap_or_else(|| pricing.unknown.to_string());
        let discount = card
            .get(pricing.discount)
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
            .unwrap_or(pricing.no_discount)
            .to_string();
        (price, discount)
    } else if let Some((_, price, discount)) =
        pricing.fixed.iter().find(|(s, _, _)| *s == status)
    {
        (price.to_string(), discount.to_string())
    } else {
        (pricing.unknown.to_string(), pricing.unknown.to_string())
    };
    card.insert(pricing.price.to_string(), price);
    card.insert(pricing.discount.to_string(), discount);
}

/// Reads every card in a listing snapshot, in document order.
///
/// Duplicates are kept; deduplication is the collector's job.
///
/// # Returns
///
/// The resolved cards and the number of item elements skipped because
/// their link did not resolve.
pub fn harvest_cards(
    content: &str,
    listing: &ListingSpec,
    resolver: &ItemResolver,
) -> (Vec<CardSnapshot>, usize) {
    let html = Html::parse_document(content);
    let mut cards = Vec::new();
    let mut skipped = 0;
    for item in select_all(html.root_element(), listing.item) {
        let link = match listing.link {
            Some(selector) => select_all(item, selector).into_iter().next(),
            None => Some(item),
        };
        let resolved = link.and_then(|a| {
            ["href", "onclick"]
                .iter()
                .filter_map(|attr| a.value().attr(attr))
                .find_map(|href| resolver.resolve(href))
        });
        match resolved {
            Some((detail_url, code)) => {
                let mut card = extract_card(item, listing.fields);
                if let Some(pricing) = &listing.pricing {
                    apply_pricing(pricing, &mut card);
                }
                cards.push(CardSnapshot {
                    detail_url,
                    code,
                    card,
                });
            }
            None => skipped += 1,
        }
    }
    (cards, skipped)
}

/// Text of the element matched by `selector`, if any (used for the active
/// page marker).
pub fn marker_text(content: &str, selector: &str) -> Option<String> {
    let html = Html::parse_document(content);
    select_all(html.root_element(), selector)
        .first()
        .map(|e| node_text(*e))
}

/// Filters and normalises partition labels read from the filter panel.
///
/// Labels are normalised with [`normalize_label`]. With a non-empty
/// `canonical` list only those labels are kept (in page order); otherwise every
/// non-empty label is. Duplicates are dropped.
pub fn partition_labels(raw: &[String], canonical: &[&str]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for label in raw.iter().map(|t| normalize_label(t)) {
        let accepted = if canonical.is_empty() {
            !label.is_empty()
        } else {
            canonical.contains(&label.as_str())
        };
        if accepted && !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels
}

fn next_sibling_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

/// Label/value pairs of a detail table. Labels have all whitespace removed.
pub fn label_pairs(html: &Html, table: &LabelTable) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for row in select_all(html.root_element(), table.row) {
        let Some(label) = select_all(row, table.label).into_iter().next() else {
            continue;
        };
        let value = match table.value {
            Some(selector) => select_all(row, selector).into_iter().next(),
            None => next_sibling_element(label),
        };
        let label_text = remove_whitespace(&node_text(label));
        if label_text.is_empty() {
            continue;
        }
        pairs.push((label_text, value.map(node_text).unwrap_or_default()));
    }
    pairs
}

fn is_blank(row: &Row, field: &str) -> bool {
    row.get(field).map(|v| v.trim().is_empty()).unwrap_or(true)
}

/// Assigns label/value pairs to field slots.
///
/// For each pair the rules are evaluated top to bottom; the first rule that
/// matches the label and whose field is still empty takes the value. A
/// filled field is never overwritten.
///
/// # Returns
///
/// Number of fields filled.
pub fn apply_label_rules(pairs: &[(String, String)], rules: &[LabelRule], row: &mut Row) -> usize {
    let mut filled = 0;
    for (label, value) in pairs {
        let Some(rule) = rules
            .iter()
            .find(|r| r.matches(label) && is_blank(row, r.field))
        else {
            continue;
        };
        let value = if rule.squash {
            remove_whitespace(value)
        } else {
            value.trim().to_string()
        };
        if !value.is_empty() {
            row.insert(rule.field.to_string(), value);
            filled += 1;
        }
    }
    filled
}

static AMOUNT_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^\d]+)(\d)").unwrap_or_else(|e| panic!("amount label pattern: {e}"))
});

fn first_text(scope: ElementRef<'_>, selector: &str) -> String {
    select_all(scope, selector)
        .first()
        .map(|e| node_text(*e))
        .unwrap_or_default()
}

fn joined(parts: impl Iterator<Item = String>) -> String {
    parts
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(LINE_DELIMITER)
}

fn amount(text: &str) -> String {
    AMOUNT_LABEL
        .replace(&remove_whitespace(text), "${1} : ${2}")
        .into_owned()
}

fn text_value(matches: &[ElementRef<'_>], mode: TextMode) -> String {
    match mode {
        TextMode::First => matches
            .iter()
            .map(|e| node_text(*e))
            .find(|t| !t.is_empty())
            .unwrap_or_default(),
        TextMode::Lines => matches
            .first()
            .map(|e| node_lines(*e).join(LINE_DELIMITER))
            .unwrap_or_default(),
        TextMode::JoinAll(separator) => matches
            .iter()
            .map(|e| node_text(*e))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(separator),
        TextMode::Pairs { left, right, style } => joined(matches.iter().map(|item| {
            let l = first_text(*item, left);
            if l.is_empty() {
                return String::new();
            }
            let r = first_text(*item, right);
            match style {
                PairStyle::Colon => format!("{l} : {r}"),
                PairStyle::Paren => format!("{l}({r})"),
            }
        })),
        TextMode::Captioned(parts) => matches
            .first()
            .map(|block| {
                joined(parts.iter().map(|(caption, selector)| {
                    let t = first_text(*block, selector);
                    if t.is_empty() || caption.is_empty() {
                        t
                    } else {
                        format!("{caption} : {t}")
                    }
                }))
            })
            .unwrap_or_default(),
        TextMode::Amounts => joined(matches.iter().map(|e| amount(&node_text(*e)))),
        TextMode::Counts { parts, otherwise } => matches
            .first()
            .map(|block| {
                let counts = joined(
                    parts
                        .iter()
                        .map(|p| first_text(*block, p).replacen(' ', " : ", 1)),
                );
                if counts.is_empty() {
                    first_text(*block, otherwise)
                } else {
                    counts
                }
            })
            .unwrap_or_default(),
        TextMode::Labelled {
            label,
            value,
            captions,
            clip,
        } => joined(matches.iter().map(|row| {
            let l = first_text(*row, label);
            let Some((_, caption)) = captions.iter().find(|(key, _)| l.contains(key)) else {
                return String::new();
            };
            let v = first_text(*row, value);
            let v = clip
                .iter()
                .find(|c| v.contains(*c))
                .map(|c| c.to_string())
                .unwrap_or(v);
            format!("{caption} : {v}")
        })),
    }
}

/// Reads free-text fields into `row`. Fields already filled are kept.
pub fn extract_text_fields(html: &Html, texts: &[TextField], row: &mut Row) {
    let root = html.root_element();
    for text in texts {
        if !is_blank(row, text.field) {
            continue;
        }
        let scopes: Vec<ElementRef<'_>> = match text.scope {
            TextScope::Page => vec![root],
            TextScope::Containing(container, marker) => select_all(root, container)
                .into_iter()
                .filter(|c| node_text(*c).contains(marker))
                .collect(),
            TextScope::Nth(container, n) => {
                select_all(root, container).into_iter().nth(n).into_iter().collect()
            }
        };
        let matches: Vec<ElementRef<'_>> = scopes
            .iter()
            .flat_map(|scope| select_all(*scope, text.selector))
            .collect();
        let value = text_value(&matches, text.mode);
        if !value.is_empty() {
            row.insert(text.field.to_string(), value);
        }
    }
}

/// One extraction pass over a detail snapshot: label tables, then free-text
/// fields.
pub fn extract_detail(content: &str, spec: &DetailSpec) -> Row {
    let html = Html::parse_document(content);
    let mut row = Row::new();
    for table in spec.tables {
        let pairs = label_pairs(&html, table);
        apply_label_rules(&pairs, spec.rules, &mut row);
    }
    extract_text_fields(&html, spec.texts, &mut row);
    row
}

/// Number of `fields` holding a non-blank value.
pub fn count_filled(row: &Row, fields: &[&str]) -> usize {
    fields.iter().filter(|f| !is_blank(row, f)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::{HEYDEALER, REBORNCAR};

    #[test]
    fn test_path_tail_identity() {
        let resolver = ItemResolver::new(HEYDEALER.base_url, HEYDEALER.listing.identity).unwrap();
        assert_eq!(
            resolver.resolve("/market/cars/7yBJYAyE?search=1"),
            Some((
                "https://www.heydealer.com/market/cars/7yBJYAyE".to_string(),
                "7yBJYAyE".to_string()
            ))
        );
        // the listing root is not an item
        assert_eq!(resolver.resolve("/market/cars/"), None);
        assert_eq!(resolver.resolve("/market/cars"), None);
        assert_eq!(resolver.resolve("/market/other/x"), None);
    }

    #[test]
    fn test_pattern_identity() {
        let resolver = ItemResolver::new(REBORNCAR.base_url, REBORNCAR.listing.identity).unwrap();
        let (url, code) = resolver
            .resolve("javascript:fnDetailMove('C25120300012','N');")
            .unwrap();
        assert_eq!(code, "C25120300012");
        assert_eq!(
            url,
            "https://www.reborncar.co.kr/smartbuy/SB1002.rb?productId=C25120300012"
        );
        assert_eq!(resolver.resolve("javascript:void(0)"), None);
    }

    #[test]
    fn test_harvest_heydealer_cards() {
        let content = r#"
            <a href="/market/cars">전체</a>
            <a href="/market/cars/abc?x=1">
              <div class="css-9j6363">
                <span class="css-jk6asd">폭스바겐 파사트GT(B8)</span>
                <span class="css-jk6asd">2.0 TDI</span>
                <span class="css-13wylk3">프레스티지</span>
              </div>
              <div class="css-6bza35">2022년ㆍ3.2만km</div>
              <div class="css-105xtr1"><div class="css-1066lcq"><div class="css-dbu2tk">3,150만원</div></div></div>
            </a>
            <a href="/market/cars/">빈 링크</a>
        "#;
        let resolver = ItemResolver::new(HEYDEALER.base_url, HEYDEALER.listing.identity).unwrap();
        let (cards, skipped) = harvest_cards(content, &HEYDEALER.listing, &resolver);
        assert_eq!(skipped, 1);
        assert_eq!(cards.len(), 1);
        let card = &cards[0];
        assert_eq!(card.code, "abc");
        assert_eq!(card.card["model_name"], "폭스바겐 파사트GT(B8)");
        assert_eq!(card.card["model_second_name"], "2.0 TDI");
        assert_eq!(card.card["grade_name"], "프레스티지");
        assert_eq!(card.card["year"], "2022년");
        assert_eq!(card.card["km"], "3.2만km");
        // falls back to the second price selector
        assert_eq!(card.card["sale_price"], "3,150만원");
    }

    #[test]
    fn test_harvest_reborncar_cards_with_defaults() {
        let content = r#"
            <ul class="lp-box smartbuy-lp">
              <li class="lp-con swiper-slide">
                <a class="lp-thumnail" href="javascript:fnDetailMove('P1');"></a>
                <p class="lp-car-name">기아 올 뉴K3</p>
                <ul class="lp-summery"><li>21년 3월</li><li>내비</li></ul>
              </li>
              <li class="lp-con swiper-slide lp-banner"><a class="lp-thumnail" href="javascript:fnDetailMove('AD');"></a></li>
            </ul>
        "#;
        let resolver = ItemResolver::new(REBORNCAR.base_url, REBORNCAR.listing.identity).unwrap();
        let (cards, skipped) = harvest_cards(content, &REBORNCAR.listing, &resolver);
        assert_eq!(skipped, 0);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].code, "P1");
        assert_eq!(cards[0].card["status"], "판매중");
        assert_eq!(cards[0].card["car_navi"], "내비");
        assert_eq!(cards[0].card["car_seat"], "");
        // on sale without a readable price
        assert_eq!(cards[0].card["car_main_pay"], "-");
        assert_eq!(cards[0].card["amtsel"], "0");
        assert_eq!(cards[0].card["copytext"], "");
    }

    #[test]
    fn test_reborncar_prices_follow_status() {
        let card = |id: &str, status: &str, extra: &str| {
            format!(
                r#"<li class="lp-con swiper-slide">
                  <a class="lp-thumnail" href="javascript:fnDetailMove('{id}');"></a>
                  <span class="lp-status">{status}</span>
                  <div class="car-pay"><p class="pay"><b>2,450</b>만원</p>{extra}</div>
                </li>"#
            )
        };
        let content = format!(
            r#"<ul class="lp-box smartbuy-lp">{}{}{}{}{}</ul>"#,
            card("A", "판매중", ""),
            card("B", "상담중", r#"<span class="discount">120만원 할인</span>"#),
            card("C", "준비중", ""),
            card("D", "판매완료", ""),
            card("E", "광고", ""),
        );
        let resolver = ItemResolver::new(REBORNCAR.base_url, REBORNCAR.listing.identity).unwrap();
        let (cards, _) = harvest_cards(&content, &REBORNCAR.listing, &resolver);
        let prices: Vec<(&str, &str)> = cards
            .iter()
            .map(|c| (c.card["car_main_pay"].as_str(), c.card["amtsel"].as_str()))
            .collect();
        assert_eq!(
            prices,
            vec![
                ("2,450만원", "0"),
                ("2,450만원", "120만원 할인"),
                ("0만원", "-"),
                ("판매완료", "-"),
                ("-", "-"),
            ]
        );
    }

    #[test]
    fn test_reborncar_time_deal_card() {
        let content = r#"
            <ul class="lp-box smartbuy-lp">
              <li class="lp-con swiper-slide">
                <a class="lp-thumnail" href="javascript:fnDetailMove('T1');"></a>
                <div class="lp-timedeal"><span class="lp-timedeal-count">02:13:45</span></div>
              </li>
            </ul>
        "#;
        let resolver = ItemResolver::new(REBORNCAR.base_url, REBORNCAR.listing.identity).unwrap();
        let (cards, _) = harvest_cards(content, &REBORNCAR.listing, &resolver);
        assert_eq!(cards[0].card["copytext"], "타임딜");
        assert_eq!(cards[0].card["endtimedeal"], "02:13:45");
    }

    #[test]
    fn test_partition_labels() {
        let raw: Vec<String> = ["차체", "경·소형", "세단", "SUV · RV", "세단", "1,234대 보기"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            partition_labels(&raw, HEYDEALER.partitions.unwrap().canonical),
            vec!["경∙소형", "세단", "SUV∙RV"]
        );
        assert_eq!(partition_labels(&raw, &[]).len(), 5);
    }

    #[test]
    fn test_label_rules_first_match_wins() {
        let rules = HEYDEALER.detail.rules;
        let pairs: Vec<(String, String)> = [
            ("연식", "2021년"),
            ("실내세차", "완료"),
            ("실내", "깨끗함"),
            ("사고", "무사고"),
            ("사고", "단순교환"),
        ]
        .iter()
        .map(|(l, v)| (l.to_string(), v.to_string()))
        .collect();
        let mut row = Row::new();
        assert_eq!(apply_label_rules(&pairs, rules, &mut row), 4);
        assert_eq!(row["year"], "2021년");
        assert_eq!(row["inner_car_wash"], "완료");
        assert_eq!(row["interior_description"], "깨끗함");
        // a filled field is never overwritten
        assert_eq!(row["accident"], "무사고");
    }

    #[test]
    fn test_extract_heydealer_detail() {
        let content = r#"
            <div class="css-113wzqa"><span class="css-1b7o1k1">연 식</span><span>2021년 3월</span></div>
            <div class="css-113wzqa"><span class="css-1b7o1k1">주행거리</span><span>32,000km</span></div>
            <div class="css-113wzqa"><span class="css-1b7o1k1">헤이딜러 보증</span><div><b>1년</b> 2만km</div></div>
            <div class="css-5pr39e"><span class="css-13wylk3">선루프</span><span class="css-1396o7r">HUD</span></div>
            <div class="css-1cfq7ri"><h3>출고 정보</h3><div class="css-1n3oo4w"><b>출고일</b> 2021.03<br>색상 흰색</div></div>
            <div class="css-1cfq7ri"><h3>기타</h3><div class="css-1n3oo4w">무시</div></div>
            <p class="css-yfldxx">관리 <strong>잘 된</strong> 차량입니다<br>추천합니다</p>
        "#;
        let row = extract_detail(content, &HEYDEALER.detail);
        assert_eq!(row["year"], "2021년 3월");
        assert_eq!(row["km"], "32,000km");
        assert_eq!(row["guarantee"], "1년 2만km");
        assert_eq!(row["options"], "선루프, HUD");
        assert_eq!(row["delivery_information"], "출고일 2021.03 | 색상 흰색");
        assert_eq!(row["recommendation_comment"], "관리 잘 된 차량입니다 | 추천합니다");
        assert_eq!(count_filled(&row, HEYDEALER.detail.core_fields), 3);
    }

    #[test]
    fn test_extract_reborncar_detail() {
        let content = r#"
            <div class="car-main-info"><span class="car-number">12가3456</span></div>
            <ul><li>신차 출고가 <span class="car-new-price">3,000만원</span></li></ul>
            <div class="vip-car-info-body">
              <div class="info-list-con"><p class="info-txt">사고여부</p><p class="info-tit">무사고</p></div>
              <div class="info-list-con"><p class="info-txt">신차가격 대비</p><p class="info-tit">62 %</p></div>
            </div>
            <div class="vip-option-list"><span class="vip-option-txt">내비</span><span class="vip-option-txt">열선</span></div>
        "#;
        let row = extract_detail(content, &REBORNCAR.detail);
        assert_eq!(row["car_number"], "12가3456");
        assert_eq!(row["info_list_1"], "3,000만원");
        assert_eq!(row["aci_gbn"], "무사고");
        assert_eq!(row["relamt_per-parent"], "62%");
        assert_eq!(row["option_list"], "내비 | 열선");
        assert!(!row.contains_key("smell_grade"));
        assert!(!row.contains_key("figure_panel"));
    }

    #[test]
    fn test_extract_reborncar_pay_and_condition_panels() {
        let content = r#"
            <div class="car-info"><p class="car-pay">2,450만원</p></div>
            <div class="car-info"><div class="car-sub-pay"><ul class="plan-pay">
              <li>할부 월 45만원</li><li>리스 월 52 만원</li><li>보증금 없음</li>
            </ul></div></div>
            <div class="add-option-list">
              <div class="add-option-con"><p class="add-option-title">선루프</p><p class="add-option-pay">120만원</p></div>
              <div class="add-option-con"><p class="add-option-pay">무시</p></div>
            </div>
            <div class="car-figure-info-list">
              <div class="figure-panel"><div class="cont sheeting-status">
                <p class="sheeting-count">판금 1건</p><p class="change-count">교환 2건</p>
              </div></div>
            </div>
        "#;
        let row = extract_detail(content, &REBORNCAR.detail);
        assert_eq!(row["plan_pay"], "할부월 : 45만원 | 리스월 : 52만원 | 보증금없음");
        assert_eq!(row["add_option_list"], "선루프(120만원)");
        assert_eq!(row["figure_panel"], "판금 : 1건 | 교환 : 2건");

        let clean = r#"<div class="car-figure-info-list"><div class="figure-panel">
            <div class="cont sheeting-status"><p class="success">무사고 차량</p></div>
        </div></div>"#;
        let row = extract_detail(clean, &REBORNCAR.detail);
        assert_eq!(row["figure_panel"], "무사고 차량");
    }

    #[test]
    fn test_extract_reborncar_inspection_sections() {
        let tire = |position: &str, depth: &str, date: &str| {
            format!(
                r#"<div class="tire-summery {position}">
                  <p class="tire-tread"><span class="trad-txt">{depth}</span></p>
                  <p class="tire-date"><span class="date-txt">{date}</span></p>
                </div>"#
            )
        };
        let surety = |rows: &str| {
            format!(
                r#"<div class="brand-surety-con"><ul class="surety-list-con">{rows}</ul></div>"#
            )
        };
        let row_html = |label: &str, value: &str| {
            format!(
                r#"<li class="surety-con"><div class="surety-con-head"><span class="txt">{label}</span><span class="cont-txt">{value}</span></div></li>"#
            )
        };
        let content = format!(
            r#"<div class="vip-aqi-list vip-aqi-group">
                 <div class="aqi-list"><p class="title">외관</p><p class="status">양호</p></div>
                 <div class="aqi-list"><p class="title">실내</p><p class="status">보통</p></div>
               </div>
               <ul class="aqi-notice-list">
                 <li class="aqi-notice-list-txt"><p class="title">주의</p><p class="txt">스크래치</p></li>
               </ul>
               <div class="aqi-tire"><div class="cont aqi-tire-tread">{}{}</div></div>
               <div class="aqi-battey"><div class="cont bettey-exist">
                 <div class="bettery-info"><span class="battey-count">SOH 95%</span></div>
               </div></div>
               <div class="brand-surety-form"><div class="brand-surety-new">{}{}</div></div>"#,
            tire("front left", "5.2mm", "2023년 10주"),
            tire("back right", "4.8mm", ""),
            surety(&format!(
                "{}{}{}",
                row_html("보증 기간 (차체)", "2027.03 까지"),
                row_html("주행 거리 한도", "100,000km"),
                row_html("기타", "무시"),
            )),
            surety(&row_html("보증 기간", "보증 만료 (2024.01)")),
        );
        let row = extract_detail(&content, &REBORNCAR.detail);
        assert_eq!(row["aqi_list"], "외관 : 양호 | 실내 : 보통");
        assert_eq!(row["aqi_notice_list"], "주의 : 스크래치");
        assert_eq!(
            row["tire_summery_front_left"],
            "트레드 깊이 : 5.2mm | 제조일 : 2023년 10주"
        );
        assert_eq!(row["tire_summery_back_right"], "트레드 깊이 : 4.8mm");
        assert!(!row.contains_key("tire_summery_back_left"));
        assert_eq!(row["bettery_info"], "SOH 95%");
        assert_eq!(
            row["brand_surety_con_1"],
            "보증 기간 : 2027.03 까지 | 주행 거리 : 100,000km"
        );
        assert_eq!(row["brand_surety_con_2"], "보증 기간 : 보증 만료");
    }

    #[test]
    fn test_apply_pricing_trims_values() {
        let pricing = REBORNCAR.listing.pricing.unwrap();
        let mut card: Row = [("status", " 계약중 "), ("car_main_pay", " 990 "), ("amtsel", " ")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        apply_pricing(&pricing, &mut card);
        assert_eq!(card["car_main_pay"], "990만원");
        assert_eq!(card["amtsel"], "0");
    }

    #[test]
    fn test_marker_text() {
        let content = r#"<ul><li class="pagination-con page-num active"><a>3</a></li></ul>"#;
        assert_eq!(
            marker_text(content, "li.pagination-con.page-num.active").as_deref(),
            Some("3")
        );
        assert_eq!(marker_text("<p></p>", "li.active"), None);
    }
}
