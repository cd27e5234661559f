use std::time::Duration;

use super::*;

const LIST_COLUMNS: &[&str] = &[
    "model_sn",
    "brand_id",
    "brand_name",
    "model_cd",
    "model_name",
    "model_second_name",
    "grade_name",
    "car_type",
    "year",
    "km",
    "sale_price",
    "detail_url",
    "date_crtr_pnttm",
    "create_dt",
];

const DETAIL_COLUMNS: &[&str] = &[
    "model_sn",
    "brand_id",
    "brand_name",
    "model_cd",
    "model_name",
    "model_second_name",
    "grade_name",
    "year",
    "km",
    "refund",
    "guarantee",
    "accident",
    "inner_car_wash",
    "insurance",
    "exterior_description",
    "interior_description",
    "options",
    "delivery_information",
    "recommendation_comment",
    "tire",
    "tinting",
    "car_key",
    "detail_url",
    "date_crtr_pnttm",
    "create_dt",
];

const CARD_FIELDS: &[CardField] = &[
    CardField {
        column: "model_name",
        selectors: &[".css-9j6363 .css-jk6asd"],
        source: FieldSource::Nth(0),
        default: "",
    },
    CardField {
        column: "model_second_name",
        selectors: &[".css-9j6363 .css-jk6asd"],
        source: FieldSource::Nth(1),
        default: "",
    },
    CardField {
        column: "grade_name",
        selectors: &[".css-9j6363 .css-13wylk3"],
        source: FieldSource::Text,
        default: "",
    },
    CardField {
        column: "year",
        selectors: &[".css-6bza35"],
        source: FieldSource::SplitPart {
            separator: "ㆍ",
            index: 0,
        },
        default: "",
    },
    CardField {
        column: "km",
        selectors: &[".css-6bza35"],
        source: FieldSource::SplitPart {
            separator: "ㆍ",
            index: 1,
        },
        default: "",
    },
    CardField {
        column: "sale_price",
        selectors: &[
            ".css-105xtr1 .css-1066lcq .css-dbu2tk .css-8sjynn",
            ".css-105xtr1 .css-1066lcq .css-dbu2tk",
        ],
        source: FieldSource::Text,
        default: "",
    },
];

const LABEL_RULES: &[LabelRule] = &[
    LabelRule::new("연식", "year"),
    LabelRule::new("주행거리", "km"),
    LabelRule::new("환불", "refund"),
    LabelRule::new("헤이딜러보증", "guarantee"),
    LabelRule::new("사고", "accident"),
    LabelRule::new("실내세차", "inner_car_wash"),
    LabelRule::new("자차보험처리", "insurance"),
    LabelRule::new("외부", "exterior_description"),
    LabelRule::new("실내", "interior_description").excluding("세차"),
    LabelRule::new("타이어", "tire"),
    LabelRule::new("틴팅", "tinting"),
    LabelRule::new("차키", "car_key"),
];

const TEXT_FIELDS: &[TextField] = &[
    TextField::new(
        "options",
        ".css-5pr39e .css-13wylk3, .css-5pr39e .css-1396o7r",
        TextMode::JoinAll(", "),
    ),
    TextField::new("delivery_information", ".css-1n3oo4w", TextMode::Lines)
        .within(TextScope::Containing(".css-1cfq7ri", "출고 정보")),
    TextField::new("recommendation_comment", ".css-yfldxx", TextMode::Lines),
];

const IMAGE_REGIONS: &[ImageRegion] = &[
    ImageRegion {
        scope: ".css-12qft46 .css-ltrevz",
        nth: Some(1),
        selectors: &[
            ".css-5pr39e .css-1i3qy3r .css-1dpi6xl button.css-q47uzu img.css-q38rgl",
            "button.css-q47uzu img.css-q38rgl",
            "button img, .css-q47uzu img",
        ],
        mode: RegionMode::FirstMatch,
    },
    ImageRegion {
        scope: ".css-12qft46 .css-ltrevz",
        nth: Some(3),
        selectors: &[
            ".css-5pr39e .css-1i3qy3r .css-hf19cn .css-1a3591h img.css-158t7i4",
            ".css-5pr39e .css-1i3qy3r .css-w9nhgi img.css-158t7i4",
            ".css-hf19cn .css-1a3591h img",
            ".css-hf19cn .css-w9nhgi img",
            ".css-w9nhgi img.css-158t7i4",
        ],
        mode: RegionMode::All,
    },
];

pub const HEYDEALER: SiteProfile = SiteProfile {
    site: Site::Heydealer,
    base_url: "https://www.heydealer.com",
    listing_url: "https://www.heydealer.com/market/cars",
    list_file: "heydealer_list.csv",
    detail_file: "heydealer_detail.csv",
    columns: ColumnKeys {
        sn: "model_sn",
        code: "model_cd",
        detail_url: "detail_url",
        brand_id: Some("brand_id"),
        brand_name: "brand_name",
        partition: "car_type",
        date: "date_crtr_pnttm",
        minute: "create_dt",
        model_name: "model_name",
        model_group: None,
    },
    list_columns: LIST_COLUMNS,
    detail_columns: DETAIL_COLUMNS,
    taxonomy: TaxonomySpec {
        source: TaxonomySource::CarMetaApi,
        file_name: "heydealer_brand_list.csv",
        key_columns: &["model_name", "model_group_name"],
        brand_id_column: Some("brand_id"),
        brand_name_column: "brand_name",
        model_group_column: None,
        key_separator: None,
        strategies: &[
            MatchStrategy::Exact,
            MatchStrategy::StripLeadingToken,
            MatchStrategy::BrandToken,
        ],
    },
    listing: ListingSpec {
        ready: None,
        item: "a[href^='/market/cars/']",
        link: None,
        identity: ItemIdentity::PathTail {
            href_prefix: "/market/cars/",
        },
        fields: CARD_FIELDS,
        pricing: None,
        mode: ListingMode::InfiniteScroll,
    },
    partitions: Some(PartitionFilter {
        open: Some(TextTarget {
            selector: "button",
            text: TextMatch::Exact("차체"),
        }),
        options: "button",
        canonical: &[
            "경∙소형",
            "세단",
            "SUV∙RV",
            "쿠페",
            "리무진",
            "컨버터블",
            "해치백",
        ],
        apply: Some(TextTarget {
            selector: "button",
            text: TextMatch::Pattern(r"^[\d,]+대\s*보기$"),
        }),
        clear: ClearMode::ToggleOption,
        list_file: "heydealer_car_type_list.csv",
    }),
    detail: DetailSpec {
        ready: &[
            ReadyProbe {
                selector: ".css-12qft46",
                timeout: Duration::from_secs(20),
            },
            ReadyProbe {
                selector: ".css-113wzqa",
                timeout: Duration::from_secs(10),
            },
        ],
        scroll_step: 500,
        tables: &[LabelTable {
            row: ".css-113wzqa",
            label: ".css-1b7o1k1",
            value: None,
        }],
        rules: LABEL_RULES,
        texts: TEXT_FIELDS,
        core_fields: &["year", "km", "refund", "guarantee", "accident"],
        images: ImageSpec {
            regions: IMAGE_REGIONS,
            fallback: &[
                "img[src*='heydealer.com'], img[src*='cdn.'], .css-w9nhgi img, .css-1a3591h img, main img",
            ],
            sweep_hints: &["heydealer", "cdn."],
        },
        skip: None,
        blank_sentinel: None,
    },
};
