use partnerscan_core::{FieldSelector, FieldSelectors, RewardType, UNKNOWN_LOCATION};

use super::*;

fn text(css: &str) -> FieldSelector {
    FieldSelector::Text(css.to_owned())
}

fn source(fields: FieldSelectors) -> SourceConfig {
    SourceConfig {
        name: "testbank".to_owned(),
        url: "https://bank.example/partners".to_owned(),
        entry_selector: "div.partner".to_owned(),
        fields,
        next_page_selector: Some("a.next".to_owned()),
        max_pages: None,
        notes: None,
    }
}

fn name_only() -> FieldSelectors {
    FieldSelectors {
        name: text(".name"),
        phone: None,
        address: None,
        city: None,
        category: None,
        cashback: None,
        miles: None,
        installments: None,
        popularity: None,
    }
}

fn directory_source() -> CompiledSource {
    let fields = FieldSelectors {
        phone: Some(text(".phone")),
        address: Some(text(".address")),
        category: Some(text(".category")),
        cashback: Some(text(".cashback")),
        ..name_only()
    };
    CompiledSource::compile(&source(fields)).unwrap()
}

const DIRECTORY: &str = r#"
<html><body>
  <div class="partner">
    <span class="name"> Zara </span>
    <span class="phone">+994 (12) 404-00-00</span>
    <span class="address">Bakı ş., Nəsimi r., 28 May küç. 3</span>
    <span class="category">Geyim</span>
    <span class="cashback">5%</span>
  </div>
  <div class="partner">
    <span class="name">Kontakt Home</span>
    <span class="address">Gəncə ş., Atatürk pr. 1</span>
  </div>
  <div class="partner">
    <span class="name">Baku Electronics</span>
    <span class="phone">(012) 555-12-12; (050) 111-11-11</span>
    <span class="cashback">0%</span>
  </div>
  <a class="next" href="?page=2">Növbəti</a>
</body></html>
"#;

#[test]
fn extracts_every_entry_in_document_order() {
    let out = extract_page(&directory_source(), DIRECTORY);
    assert_eq!(out.skipped, 0);
    let names: Vec<&str> = out.records.iter().map(PartnerRecord::name).collect();
    assert_eq!(names, vec!["Zara", "Kontakt Home", "Baku Electronics"]);
}

#[test]
fn missing_phone_is_null_not_dropped() {
    let out = extract_page(&directory_source(), DIRECTORY);
    let phones: Vec<Option<&str>> = out.records.iter().map(PartnerRecord::phone).collect();
    assert_eq!(
        phones,
        vec![Some("994124040000"), None, Some("0125551212")]
    );
}

#[test]
fn derives_location_and_reward() {
    let out = extract_page(&directory_source(), DIRECTORY);
    let zara = &out.records[0];
    assert_eq!(zara.location(), "Bakı - Nəsimi");
    assert_eq!(zara.category(), Some("Geyim"));
    assert_eq!(zara.reward_type(), RewardType::Cashback);
    assert_eq!(zara.cashback_rate(), Some(5.0));
    assert_eq!(zara.source(), "testbank");

    let kontakt = &out.records[1];
    assert_eq!(kontakt.location(), "Gəncə");
    assert_eq!(kontakt.reward_type(), RewardType::NoData);

    // 0% is not a cashback offer.
    let electronics = &out.records[2];
    assert_eq!(electronics.cashback_rate(), None);
    assert_eq!(electronics.reward_type(), RewardType::NoData);
    assert_eq!(electronics.location(), UNKNOWN_LOCATION);
}

#[test]
fn page_without_valid_entries_counts_skips() {
    let html = r#"
        <div class="partner"><span class="phone">012 404 00 00</span></div>
        <div class="partner"><span class="name">   </span></div>
    "#;
    let out = extract_page(&directory_source(), html);
    assert!(out.records.is_empty());
    assert_eq!(out.skipped, 2);
}

#[test]
fn page_without_entries_is_empty() {
    let out = extract_page(&directory_source(), "<html><body><p>Tezliklə</p></body></html>");
    assert!(out.records.is_empty());
    assert_eq!(out.skipped, 0);
}

#[test]
fn attributes_on_entry_and_repeated_installment_items() {
    let fields = FieldSelectors {
        category: Some(text(".desc")),
        cashback: Some(FieldSelector::Attr {
            selector: None,
            attr: "data-percent".to_owned(),
        }),
        installments: Some(FieldSelector::Attr {
            selector: Some(".taksit-item".to_owned()),
            attr: "class".to_owned(),
        }),
        ..name_only()
    };
    let compiled = CompiledSource::compile(&source(fields)).unwrap();
    let html = r#"
        <div class="partner" data-percent="3">
          <span class="name">Bravo</span><span class="desc">Market</span>
          <i class="taksit-item month3"></i><i class="taksit-item month6"></i>
        </div>
        <div class="partner">
          <span class="name">Irshad</span>
          <i class="taksit-item month12"></i><i class="taksit-item month3"></i>
        </div>
    "#;
    let out = extract_page(&compiled, html);
    assert_eq!(out.records.len(), 2);

    let bravo = &out.records[0];
    assert_eq!(bravo.reward_type(), RewardType::Cashback);
    assert_eq!(
        bravo.installment_terms().iter().copied().collect::<Vec<_>>(),
        vec![3, 6]
    );

    let irshad = &out.records[1];
    assert_eq!(irshad.reward_type(), RewardType::InstallmentOnly);
    assert_eq!(
        irshad.installment_terms().iter().copied().collect::<Vec<_>>(),
        vec![3, 12]
    );
}

#[test]
fn miles_and_popularity() {
    let fields = FieldSelectors {
        miles: Some(text(".miles")),
        popularity: Some(FieldSelector::Attr {
            selector: None,
            attr: "data-popularity".to_owned(),
        }),
        ..name_only()
    };
    let compiled = CompiledSource::compile(&source(fields)).unwrap();
    let html = r#"
        <div class="partner" data-popularity="1">
          <b class="name">AZAL</b><span class="miles">1 AZN = 3 Mil</span>
        </div>
    "#;
    let out = extract_page(&compiled, html);
    let azal = &out.records[0];
    assert_eq!(azal.reward_type(), RewardType::Miles);
    assert_eq!(azal.miles_rate(), Some(3.0));
    assert_eq!(azal.popularity_tier(), Some(PopularityTier::High));
}

#[test]
fn city_field_is_preferred_for_location() {
    let fields = FieldSelectors {
        address: Some(text("td.addr")),
        city: Some(text("td.city")),
        ..name_only()
    };
    let mut cfg = source(fields);
    cfg.entry_selector = "tr".to_owned();
    cfg.fields.name = text("td.name");
    let compiled = CompiledSource::compile(&cfg).unwrap();
    let html = r#"
        <table>
          <tr><td class="name">Araz</td><td class="addr">Nizami küç. 10</td><td class="city">Sumqayıt</td></tr>
        </table>
    "#;
    let out = extract_page(&compiled, html);
    assert_eq!(out.records[0].location(), "Sumqayıt");
}

#[test]
fn next_link_is_resolved_against_page_url() {
    let base = Url::parse("https://bank.example/az/partners?page=1").unwrap();
    let document = Html::parse_document(DIRECTORY);
    let next = directory_source().next_link(&document, &base);
    assert_eq!(
        next.as_ref().map(Url::as_str),
        Some("https://bank.example/az/partners?page=2")
    );
}

#[test]
fn next_link_absent_on_last_page() {
    let base = Url::parse("https://bank.example/az/partners").unwrap();
    let document = Html::parse_document(r#"<div class="partner"><p class="name">X</p></div>"#);
    assert!(directory_source().next_link(&document, &base).is_none());
}

#[test]
fn invalid_selector_is_reported_with_field() {
    let fields = FieldSelectors {
        phone: Some(text("span[[")),
        ..name_only()
    };
    let err = CompiledSource::compile(&source(fields)).unwrap_err();
    match err {
        ScraperError::InvalidSelector {
            source_name, field, ..
        } => {
            assert_eq!(source_name, "testbank");
            assert_eq!(field, "phone");
        }
        other => panic!("expected InvalidSelector, got {other:?}"),
    }
}
