//! Tests for the detail stage and the full crawl over a scripted page.

use tempfile::TempDir;
use used_car_crawler::collect::DetailExtractor;
use used_car_crawler::config::Site;
use used_car_crawler::error_handling::{ErrorType, InfoType, ProcessingStats, WarningType};
use used_car_crawler::export::CsvAppendSink;
use used_car_crawler::models::{DetailOutcome, ListingItem, Row, Timestamps};
use used_car_crawler::site::{SiteProfile, HEYDEALER, REBORNCAR};
use used_car_crawler::crawl_with_driver;

#[path = "helpers.rs"]
mod helpers;

use helpers::{
    cell, heydealer_card, heydealer_detail, heydealer_url, listing_page, read_csv, test_config,
    FakePage,
};

const UNPARTITIONED: SiteProfile = SiteProfile {
    partitions: None,
    ..HEYDEALER
};

const FULL_DETAIL: &[(&str, &str)] = &[
    ("연식", "2021년 3월"),
    ("주행거리", "31,000km"),
    ("환불", "3일 환불 가능"),
    ("헤이딜러 보증", "1년 2만km"),
    ("사고", "무사고"),
];

fn heydealer_item(sn: usize, code: &str, year: &str) -> ListingItem {
    let card: Row = [
        ("model_name", "기아 K5"),
        ("year", year),
        ("km", "3만km"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    ListingItem {
        sn,
        detail_url: heydealer_url(code),
        code: code.to_string(),
        partition: String::new(),
        brand: Default::default(),
        card,
        collected: Timestamps {
            date: "20260226".to_string(),
            minute: "202602261030".to_string(),
        },
    }
}

#[tokio::test]
async fn test_row_count_parity_when_every_detail_fails() {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(Site::Heydealer, dir.path());
    let codes = ["c1", "c2", "c3"];
    let cards: Vec<String> = codes
        .iter()
        .map(|c| heydealer_card(c, "기아 K5", "2022년ㆍ3만km"))
        .collect();
    let mut page = FakePage::listing(vec![listing_page(&cards)]);
    for code in codes {
        page = page.with_broken(&heydealer_url(code));
    }

    let report = crawl_with_driver(&mut page, &UNPARTITIONED, &config)
        .await
        .expect("crawl");

    assert_eq!(report.listed, 3);
    assert_eq!(report.detail_rows, 3);
    assert_eq!(report.detail_success, 0);

    let (headers, records) = read_csv(&report.detail_path);
    assert_eq!(headers.len(), HEYDEALER.detail_columns.len());
    let sns: Vec<&str> = records
        .iter()
        .map(|r| cell(&headers, r, "model_sn"))
        .collect();
    assert_eq!(sns, vec!["1", "2", "3"]);
    // list data is the floor for failed rows
    assert_eq!(cell(&headers, &records[0], "year"), "2022년");
    assert_eq!(cell(&headers, &records[0], "model_cd"), "c1");
    assert_eq!(cell(&headers, &records[0], "accident"), "");
}

#[tokio::test]
async fn test_year_falls_back_to_listing() {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(Site::Heydealer, dir.path());
    let sink = CsvAppendSink::new(dir.path().join("detail.csv"), HEYDEALER.detail_columns);
    let stats = ProcessingStats::new();

    let item = heydealer_item(1, "nyr", "2022");
    // every core field but the year
    let html = heydealer_detail(&FULL_DETAIL[1..]);
    let mut page = FakePage::default().with_detail(&item.detail_url, vec![html]);

    let extractor = DetailExtractor::new(&HEYDEALER, &config, &sink, &stats);
    let summary = extractor.extract_all(&mut page, &[item]).await;
    assert_eq!(summary.rows, 1);
    assert_eq!(summary.success, 1);

    let (headers, records) = read_csv(sink.path());
    assert_eq!(cell(&headers, &records[0], "year"), "2022");
    assert_eq!(cell(&headers, &records[0], "km"), "31,000km");
    assert_eq!(cell(&headers, &records[0], "guarantee"), "1년 2만km");
    assert!(stats.get_info_count(InfoType::FallbackFill) >= 1);
}

#[tokio::test]
async fn test_underfilled_page_is_reloaded() {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(Site::Heydealer, dir.path());
    let sink = CsvAppendSink::new(dir.path().join("detail.csv"), HEYDEALER.detail_columns);
    let stats = ProcessingStats::new();

    let item = heydealer_item(1, "slow", "2021");
    let mut page = FakePage::default().with_detail(
        &item.detail_url,
        vec![
            // first render: only the container, no rows yet
            heydealer_detail(&[]),
            heydealer_detail(FULL_DETAIL),
        ],
    );

    let extractor = DetailExtractor::new(&HEYDEALER, &config, &sink, &stats);
    let record = extractor.visit(&mut page, &item).await;

    assert_eq!(record.outcome, DetailOutcome::Filled);
    assert_eq!(page.gotos.len(), 1);
    assert_eq!(page.reloads, 1);
    assert_eq!(record.field("accident"), "무사고");
    assert_eq!(record.field("year"), "2021년 3월");
    assert_eq!(stats.get_info_count(InfoType::DetailReload), 1);
}

#[tokio::test]
async fn test_best_pass_kept_when_underfilled() {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(Site::Heydealer, dir.path());
    let sink = CsvAppendSink::new(dir.path().join("detail.csv"), HEYDEALER.detail_columns);
    let stats = ProcessingStats::new();

    let item = heydealer_item(1, "thin", "2020");
    let mut page = FakePage::default().with_detail(
        &item.detail_url,
        vec![heydealer_detail(&[("사고", "단순교환")])],
    );

    let extractor = DetailExtractor::new(&HEYDEALER, &config, &sink, &stats);
    let record = extractor.visit(&mut page, &item).await;

    assert_eq!(record.outcome, DetailOutcome::Underfilled);
    assert!(record.outcome.is_success());
    assert_eq!(page.reloads, config.retry.detail_attempts - 1);
    assert_eq!(record.field("accident"), "단순교환");
    assert_eq!(stats.get_warning_count(WarningType::DetailUnderfilled), 1);
}

#[tokio::test]
async fn test_exhausted_detail_keeps_listing_row() {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(Site::Heydealer, dir.path());
    let sink = CsvAppendSink::new(dir.path().join("detail.csv"), HEYDEALER.detail_columns);
    let stats = ProcessingStats::new();

    let item = heydealer_item(7, "gone", "2019");
    let mut page = FakePage::default().with_broken(&item.detail_url);

    let extractor = DetailExtractor::new(&HEYDEALER, &config, &sink, &stats);
    let record = extractor.visit(&mut page, &item).await;

    assert_eq!(record.outcome, DetailOutcome::Exhausted);
    assert_eq!(record.sn, 7);
    assert_eq!(record.field("model_sn"), "7");
    assert_eq!(record.field("year"), "2019");
    assert_eq!(record.field("detail_url"), item.detail_url);
    assert_eq!(
        stats.get_error_count(ErrorType::DetailNavigation),
        config.retry.detail_attempts
    );
    assert_eq!(stats.get_error_count(ErrorType::DetailExhausted), 1);
}

#[tokio::test]
async fn test_skip_rule_and_sentinel() {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(Site::Reborncar, dir.path());
    let sink = CsvAppendSink::new(dir.path().join("detail.csv"), REBORNCAR.detail_columns);
    let stats = ProcessingStats::new();

    let card: Row = [
        ("lp_car_name", "기아 올 뉴K3"),
        ("status", "판매완료"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    let item = ListingItem {
        sn: 1,
        detail_url: "https://www.reborncar.co.kr/smartbuy/SB1002.rb?productId=P9".to_string(),
        code: "P9".to_string(),
        partition: "준중형".to_string(),
        brand: Default::default(),
        card,
        collected: Timestamps::now(),
    };
    let mut page = FakePage::default();

    let extractor = DetailExtractor::new(&REBORNCAR, &config, &sink, &stats);
    let summary = extractor.extract_all(&mut page, &[item]).await;

    assert!(page.gotos.is_empty());
    assert_eq!(summary.rows, 1);
    assert_eq!(summary.success, 0);
    assert_eq!(stats.get_info_count(InfoType::DetailSkipped), 1);

    let (headers, records) = read_csv(sink.path());
    assert_eq!(cell(&headers, &records[0], "product_id"), "P9");
    assert_eq!(cell(&headers, &records[0], "car_type_name"), "준중형");
    assert_eq!(cell(&headers, &records[0], "lp_car_name"), "기아 올 뉴K3");
    assert_eq!(cell(&headers, &records[0], "status"), "판매완료");
    // reborncar writes "-" for every blank cell
    assert_eq!(cell(&headers, &records[0], "aci_gbn"), "-");
    assert_eq!(cell(&headers, &records[0], "brand_list"), "-");
    assert_eq!(cell(&headers, &records[0], "car_list"), "-");
    assert_eq!(cell(&headers, &records[0], "tire_summery_front_left"), "-");
}

#[tokio::test]
async fn test_empty_listing_writes_detail_header() {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(Site::Heydealer, dir.path());
    let mut page = FakePage::listing(vec![listing_page(&[])]);

    let report = crawl_with_driver(&mut page, &UNPARTITIONED, &config)
        .await
        .expect("crawl");

    assert_eq!(report.listed, 0);
    let (headers, records) = read_csv(&report.detail_path);
    assert_eq!(headers.len(), HEYDEALER.detail_columns.len());
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_previous_outputs_replaced_unless_kept() {
    let dir = TempDir::new().expect("temp dir");
    let mut config = test_config(Site::Heydealer, dir.path());
    let html = listing_page(&[heydealer_card("k1", "기아 K5", "2022년ㆍ3만km")]);
    let detail = heydealer_detail(FULL_DETAIL);

    for _ in 0..2 {
        let mut page = FakePage::listing(vec![html.clone()])
            .with_detail(&heydealer_url("k1"), vec![detail.clone()]);
        crawl_with_driver(&mut page, &UNPARTITIONED, &config)
            .await
            .expect("crawl");
    }
    let list_path = config.site_result_dir().join(HEYDEALER.list_file);
    assert_eq!(read_csv(&list_path).1.len(), 1);

    config.keep_existing = true;
    let html = listing_page(&[
        heydealer_card("k1", "기아 K5", "2022년ㆍ3만km"),
        heydealer_card("k2", "기아 K5", "2023년ㆍ1만km"),
    ]);
    let mut page = FakePage::listing(vec![html])
        .with_detail(&heydealer_url("k1"), vec![detail.clone()])
        .with_detail(&heydealer_url("k2"), vec![detail]);
    let report = crawl_with_driver(&mut page, &UNPARTITIONED, &config)
        .await
        .expect("crawl");

    // only the new car is listed and visited; numbering continues
    assert_eq!(report.listed, 1);
    assert!(!page.gotos.contains(&heydealer_url("k1")));
    let (headers, records) = read_csv(&list_path);
    assert_eq!(records.len(), 2);
    let urls: Vec<&str> = records
        .iter()
        .map(|r| cell(&headers, r, "detail_url"))
        .collect();
    assert_eq!(urls, vec![heydealer_url("k1"), heydealer_url("k2")]);
    let sns: Vec<&str> = records.iter().map(|r| cell(&headers, r, "model_sn")).collect();
    assert_eq!(sns, vec!["1", "2"]);

    let (headers, records) = read_csv(&report.detail_path);
    assert_eq!(records.len(), 2);
    assert_eq!(cell(&headers, &records[1], "model_sn"), "2");
    assert_eq!(cell(&headers, &records[1], "model_cd"), "k2");
    assert_eq!(report.detail_success, 1);
}

#[tokio::test]
async fn test_kept_list_numbering_starts_after_highest_sn() {
    let dir = TempDir::new().expect("temp dir");
    let mut config = test_config(Site::Heydealer, dir.path());
    config.keep_existing = true;
    let list_path = config.site_result_dir().join(HEYDEALER.list_file);
    let previous = CsvAppendSink::new(&list_path, HEYDEALER.list_columns);
    for (sn, code) in [("7", "old7"), ("3", "old3")] {
        let row: Row = [
            ("model_sn".to_string(), sn.to_string()),
            ("model_cd".to_string(), code.to_string()),
            ("detail_url".to_string(), heydealer_url(code)),
        ]
        .into_iter()
        .collect();
        previous.append(&row).expect("seed previous list");
    }

    let html = listing_page(&[
        heydealer_card("old3", "기아 K5", "2020년ㆍ5만km"),
        heydealer_card("n1", "기아 K5", "2024년ㆍ1천km"),
    ]);
    let mut page = FakePage::listing(vec![html]);
    let report = crawl_with_driver(&mut page, &UNPARTITIONED, &config)
        .await
        .expect("crawl");

    assert_eq!(report.listed, 1);
    let (headers, records) = read_csv(&list_path);
    assert_eq!(records.len(), 3);
    assert_eq!(cell(&headers, &records[2], "model_cd"), "n1");
    assert_eq!(cell(&headers, &records[2], "model_sn"), "8");
}
