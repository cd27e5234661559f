use std::time::Duration;

use super::*;

const LIST_COLUMNS: &[&str] = &[
    "model_sn",
    "product_id",
    "car_type_name",
    "brand_list",
    "car_list",
    "lp_car_name",
    "lp_car_trim",
    "release_dt",
    "car_navi",
    "car_seat",
    "car_main_pay",
    "amtsel",
    "status",
    "copytext",
    "endtimedeal",
    "detail_url",
    "date_crtr_pnttm",
    "create_dt",
];

const DETAIL_COLUMNS: &[&str] = &[
    "model_sn",
    "product_id",
    "car_type_name",
    "brand_list",
    "car_list",
    "lp_car_name",
    "lp_car_trim",
    "car_number",
    "gear_box",
    "car_color",
    "car_fuel",
    "plan_pay",
    "info_list_1",
    "aci_gbn",
    "info_tit_1",
    "special_carhistory",
    "relamt_per-parent",
    "smell_grade",
    "info_tit_2",
    "option_list",
    "add_option_list",
    "figure_panel",
    "figure_frame",
    "aqi_list",
    "aqi_notice_list",
    "tire_summery_front_left",
    "tire_summery_back_left",
    "tire_summery_back_right",
    "tire_summery_front_right",
    "bettery_info",
    "brand_surety_con_1",
    "brand_surety_con_2",
    "status",
    "detail_url",
    "date_crtr_pnttm",
    "create_dt",
];

const fn text(column: &'static str, selector: &'static [&'static str]) -> CardField {
    CardField {
        column,
        selectors: selector,
        source: FieldSource::Text,
        default: "",
    }
}

const fn summary(column: &'static str, index: usize) -> CardField {
    CardField {
        column,
        selectors: &[".lp-summery li"],
        source: FieldSource::Nth(index),
        default: "",
    }
}

const CARD_FIELDS: &[CardField] = &[
    text("lp_car_name", &[".lp-car-name"]),
    text("lp_car_trim", &[".lp-car-trim"]),
    CardField {
        column: "status",
        selectors: &[".lp-status"],
        source: FieldSource::Text,
        default: "판매중",
    },
    summary("release_dt", 0),
    summary("car_navi", 1),
    summary("car_seat", 2),
    text("car_main_pay", &[".car-pay .pay b"]),
    text("amtsel", &[".car-pay .discount"]),
    CardField {
        column: "copytext",
        selectors: &[".lp-timedeal"],
        source: FieldSource::Present("타임딜"),
        default: "",
    },
    text("endtimedeal", &[".lp-timedeal-count"]),
];

const PRICING: StatusPricing = StatusPricing {
    status: "status",
    price: "car_main_pay",
    discount: "amtsel",
    on_sale: &["판매중", "계약중", "상담중"],
    price_suffix: "만원",
    no_discount: "0",
    fixed: &[("준비중", "0만원", "-"), ("판매완료", "판매완료", "-")],
    unknown: "-",
};

const LABEL_RULES: &[LabelRule] = &[
    LabelRule::new("사고여부", "aci_gbn"),
    LabelRule::new("침수여부", "info_tit_1"),
    LabelRule::new("용도변경", "special_carhistory"),
    LabelRule::new("신차가격대비", "relamt_per-parent").squashed(),
    LabelRule::new("냄새등급", "smell_grade"),
    LabelRule::new("안심환불", "info_tit_2"),
];

const fn first(field: &'static str, selector: &'static str) -> TextField {
    TextField::new(field, selector, TextMode::First)
}

const TIRE_PARTS: TextMode = TextMode::Captioned(&[
    ("트레드 깊이", ".tire-tread .trad-txt"),
    ("제조일", ".tire-date .date-txt"),
]);

const fn tire(field: &'static str, position: &'static str) -> TextField {
    TextField::new(field, position, TIRE_PARTS)
}

const SURETY: TextMode = TextMode::Labelled {
    label: ".surety-con-head .txt",
    value: ".surety-con-head .cont-txt",
    captions: &[("보증 기간", "보증 기간"), ("주행", "주행 거리")],
    clip: &["보증 만료"],
};

const SURETY_ROW: &str = ".surety-list-con .surety-con";

const SURETY_BOX: &str = ".brand-surety-form .brand-surety-new .brand-surety-con";

const TEXT_FIELDS: &[TextField] = &[
    first("car_number", ".car-main-info .car-number"),
    first("gear_box", ".car-sub-info .car-infos .gear-box"),
    first("car_color", ".car-sub-info .car-infos .car-color"),
    first("car_fuel", ".car-sub-info .car-infos .car-fuel"),
    TextField::new("plan_pay", "li", TextMode::Amounts)
        .within(TextScope::Nth(".car-info .car-sub-pay .plan-pay", 0)),
    TextField::new("info_list_1", ".car-new-price", TextMode::First)
        .within(TextScope::Containing("li", "신차 출고가")),
    TextField::new(
        "option_list",
        ".vip-option-list .vip-option-txt",
        TextMode::JoinAll(" | "),
    ),
    TextField::new(
        "add_option_list",
        ".add-option-list .add-option-con",
        TextMode::Pairs {
            left: ".add-option-title",
            right: ".add-option-pay",
            style: PairStyle::Paren,
        },
    ),
    TextField::new(
        "figure_panel",
        ".car-figure-info-list .figure-panel .cont.sheeting-status",
        TextMode::Counts {
            parts: &[".sheeting-count", ".change-count"],
            otherwise: ".success",
        },
    ),
    first("figure_frame", ".figure-frame .cont.change-status"),
    TextField::new(
        "aqi_list",
        ".vip-aqi-list.vip-aqi-group .aqi-list",
        TextMode::Pairs {
            left: ".title",
            right: ".status",
            style: PairStyle::Colon,
        },
    ),
    TextField::new(
        "aqi_notice_list",
        ".aqi-notice-list .aqi-notice-list-txt",
        TextMode::Pairs {
            left: ".title",
            right: ".txt",
            style: PairStyle::Colon,
        },
    ),
    tire("tire_summery_front_left", ".aqi-tire-tread .tire-summery.front.left"),
    tire("tire_summery_back_left", ".aqi-tire-tread .tire-summery.back.left"),
    tire("tire_summery_back_right", ".aqi-tire-tread .tire-summery.back.right"),
    tire("tire_summery_front_right", ".aqi-tire-tread .tire-summery.front.right"),
    TextField::new(
        "bettery_info",
        ".aqi-battey .cont.bettey-exist",
        TextMode::Captioned(&[("", ".bettery-info .battey-count"), ("", ".bettey-comment")]),
    ),
    TextField::new("brand_surety_con_1", SURETY_ROW, SURETY).within(TextScope::Nth(SURETY_BOX, 0)),
    TextField::new("brand_surety_con_2", SURETY_ROW, SURETY).within(TextScope::Nth(SURETY_BOX, 1)),
];

const IMAGE_REGIONS: &[ImageRegion] = &[
    ImageRegion {
        scope: ".vip-visual-detail .visual-detail",
        nth: None,
        selectors: &[".detail-img img", "img.detail-img"],
        mode: RegionMode::FirstMatch,
    },
    ImageRegion {
        scope: ".vip-visual-list .visual-box .visual-con",
        nth: None,
        selectors: &["img"],
        mode: RegionMode::All,
    },
];

pub const REBORNCAR: SiteProfile = SiteProfile {
    site: Site::Reborncar,
    base_url: "https://www.reborncar.co.kr",
    listing_url: "https://www.reborncar.co.kr/smartbuy/SB1001.rb",
    list_file: "reborncar_list.csv",
    detail_file: "reborncar_detail.csv",
    columns: ColumnKeys {
        sn: "model_sn",
        code: "product_id",
        detail_url: "detail_url",
        brand_id: None,
        brand_name: "brand_list",
        partition: "car_type_name",
        date: "date_crtr_pnttm",
        minute: "create_dt",
        model_name: "lp_car_name",
        model_group: Some("car_list"),
    },
    list_columns: LIST_COLUMNS,
    detail_columns: DETAIL_COLUMNS,
    taxonomy: TaxonomySpec {
        source: TaxonomySource::FilterPanel(FilterPanelTaxonomy {
            brand: ".filter-brand .brand-list",
            brand_name: ".brand-name label span",
            brand_toggle: ".brand-name label",
            group: ".car-list .check-box[class*='car-']",
            group_name: "label span",
            group_toggle: "label",
            model_name: ".model-list .check-box label span",
        }),
        file_name: "reborncar_brand_list.csv",
        key_columns: &["model_list"],
        brand_id_column: None,
        brand_name_column: "brand_list",
        model_group_column: Some("car_list"),
        key_separator: Some('|'),
        strategies: &[MatchStrategy::Exact, MatchStrategy::LastToken],
    },
    listing: ListingSpec {
        ready: Some("ul.lp-box.smartbuy-lp"),
        item: "ul.lp-box.smartbuy-lp > li.lp-con.swiper-slide:not(.lp-banner):not(.swiper-slide-duplicate)",
        link: Some("a.lp-thumnail"),
        identity: ItemIdentity::Pattern {
            pattern: r"fnDetailMove\('([^']+)'",
            detail_url: "https://www.reborncar.co.kr/smartbuy/SB1002.rb?productId={id}",
        },
        fields: CARD_FIELDS,
        pricing: Some(PRICING),
        mode: ListingMode::Paginated {
            next: &[
                "li.pagination-con.page-num.active + li.pagination-con.page-num:not(.next):not(.prev) a",
                "li.pagination-con.next:not(.disabled) a",
            ],
            active: "li.pagination-con.page-num.active",
        },
    },
    partitions: Some(PartitionFilter {
        open: None,
        options: ".check-btn-box.car-type-filter .check-btn.check-btn-s.filter-chk",
        canonical: &[],
        apply: None,
        clear: ClearMode::Click(".lp-filter-list .lp-filter-choice-delete"),
        list_file: "reborncar_car_type_list.csv",
    }),
    detail: DetailSpec {
        ready: &[
            ReadyProbe {
                selector: "#info",
                timeout: Duration::from_secs(10),
            },
            ReadyProbe {
                selector: ".vip-body .vip-con",
                timeout: Duration::from_secs(8),
            },
        ],
        scroll_step: 600,
        tables: &[LabelTable {
            row: ".vip-car-info-body .info-list-con",
            label: ".info-txt",
            value: Some(".info-tit"),
        }],
        rules: LABEL_RULES,
        texts: TEXT_FIELDS,
        core_fields: &[
            "aci_gbn",
            "info_tit_1",
            "special_carhistory",
            "smell_grade",
            "info_tit_2",
        ],
        images: ImageSpec {
            regions: IMAGE_REGIONS,
            fallback: &[],
            sweep_hints: &[],
        },
        skip: Some(SkipRule {
            column: "status",
            values: &["준비중", "판매완료"],
        }),
        blank_sentinel: Some("-"),
    },
};
