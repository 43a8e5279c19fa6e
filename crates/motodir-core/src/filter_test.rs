use super::*;

fn shop(name: &str, country: &str, city: &str, business_type: &str, rating: &str) -> Shop {
    Shop {
        name: Some(name.into()),
        country: Some(country.into()),
        city: Some(city.into()),
        business_type: Some(business_type.into()),
        rating: Some(rating.into()),
        ..Shop::default()
    }
}

fn named(name: &str) -> Shop {
    Shop {
        name: Some(name.into()),
        ..Shop::default()
    }
}

fn names<'a>(result: &FilteredResult<'a>) -> Vec<&'a str> {
    result
        .iter()
        .map(|s| s.name.as_deref().unwrap_or_default())
        .collect()
}

fn catalog() -> Vec<Shop> {
    vec![
        shop("Alpine Moto", "Germany", "Munich", "Dealer", "4.2"),
        shop("Berlin Bikes", "Germany", "Berlin", "Repair", "3.9"),
        shop("Roma Garage", "Italy", "Roma", " repair ", "N/A"),
        Shop {
            address: Some("12 Brembo Street".into()),
            ..shop("Pit Stop", "Italy", "Milano", "Parts", "4.8")
        },
        named("Nameless"),
        Shop::default(),
    ]
}

#[test]
fn inactive_criteria_return_catalog_in_order() {
    let shops = catalog();
    let result = apply_filters(
        &shops,
        &FilterCriteria::default(),
        &PersonalizationContext::default(),
    );
    let expected: Vec<&Shop> = shops.iter().collect();
    assert_eq!(result.shops(), expected.as_slice());
    assert_eq!(result.len(), shops.len());
}

#[test]
fn blank_criteria_behave_as_inactive() {
    let shops = catalog();
    let criteria = FilterCriteria {
        search: "  ".into(),
        country: Some(" ".into()),
        city: Some(String::new()),
        business_type: Some("\t".into()),
    };
    let result = apply_filters(&shops, &criteria, &PersonalizationContext::default());
    assert_eq!(result.len(), shops.len());
}

#[test]
fn search_matches_address_only() {
    let shops = catalog();
    let criteria = FilterCriteria {
        search: "brembo".into(),
        ..FilterCriteria::default()
    };
    let result = apply_filters(&shops, &criteria, &PersonalizationContext::default());
    assert_eq!(names(&result), vec!["Pit Stop"]);
}

#[test]
fn search_is_case_insensitive_across_fields() {
    let shops = catalog();
    let criteria = FilterCriteria {
        search: "GERMANY".into(),
        ..FilterCriteria::default()
    };
    let result = apply_filters(&shops, &criteria, &PersonalizationContext::default());
    assert_eq!(names(&result), vec!["Alpine Moto", "Berlin Bikes"]);

    let criteria = FilterCriteria {
        search: "repair".into(),
        ..FilterCriteria::default()
    };
    let result = apply_filters(&shops, &criteria, &PersonalizationContext::default());
    assert_eq!(names(&result), vec!["Berlin Bikes", "Roma Garage"]);
}

#[test]
fn absent_fields_never_match_search() {
    let shops = vec![Shop::default()];
    let criteria = FilterCriteria {
        search: "a".into(),
        ..FilterCriteria::default()
    };
    assert!(apply_filters(&shops, &criteria, &PersonalizationContext::default()).is_empty());
}

#[test]
fn business_type_is_trimmed_and_case_insensitive() {
    let shops = catalog();
    let criteria = FilterCriteria {
        business_type: Some(" Repair ".into()),
        ..FilterCriteria::default()
    };
    let result = apply_filters(&shops, &criteria, &PersonalizationContext::default());
    assert_eq!(names(&result), vec!["Berlin Bikes", "Roma Garage"]);
}

#[test]
fn country_and_city_are_exact() {
    let shops = catalog();
    let criteria = FilterCriteria {
        country: Some("italy".into()),
        ..FilterCriteria::default()
    };
    assert!(apply_filters(&shops, &criteria, &PersonalizationContext::default()).is_empty());

    let criteria = FilterCriteria {
        country: Some("Italy".into()),
        city: Some("Milano".into()),
        ..FilterCriteria::default()
    };
    let result = apply_filters(&shops, &criteria, &PersonalizationContext::default());
    assert_eq!(names(&result), vec!["Pit Stop"]);
}

#[test]
fn city_is_not_tied_to_country_by_the_engine() {
    let shops = catalog();
    let criteria = FilterCriteria {
        country: Some("Italy".into()),
        city: Some("Berlin".into()),
        ..FilterCriteria::default()
    };
    assert!(apply_filters(&shops, &criteria, &PersonalizationContext::default()).is_empty());

    let criteria = FilterCriteria {
        city: Some("Berlin".into()),
        ..FilterCriteria::default()
    };
    let result = apply_filters(&shops, &criteria, &PersonalizationContext::default());
    assert_eq!(names(&result), vec!["Berlin Bikes"]);
}

#[test]
fn end_to_end_country_scenario() {
    let shops = vec![
        shop("A", "US", "NY", "Dealer", "4"),
        shop("B", "US", "LA", "Repair", "3"),
    ];
    let criteria = FilterCriteria {
        country: Some("US".into()),
        city: Some(String::new()),
        business_type: Some(String::new()),
        ..FilterCriteria::default()
    };
    let result = apply_filters(&shops, &criteria, &PersonalizationContext::default());
    assert_eq!(names(&result), vec!["A", "B"]);
    assert_eq!(result.len(), 2);
}

#[test]
fn personalization_filters_and_keeps_ties_in_order() {
    let shops = vec![
        Shop {
            services: Some(String::new()),
            ..named("Honda Center")
        },
        Shop {
            services: Some("honda parts too".into()),
            ..named("Yamaha Shop")
        },
        named("Other"),
    ];
    let brands = PersonalizationContext::from_brands(["honda"]);
    let result = apply_filters(&shops, &FilterCriteria::default(), &brands);
    assert_eq!(names(&result), vec!["Honda Center", "Yamaha Shop"]);
}

#[test]
fn personalization_ranks_by_distinct_brand_hits() {
    let shops = vec![
        named("Honda Only"),
        Shop {
            description: Some("We fix Honda and BMW bikes".into()),
            ..named("Both Brands")
        },
        named("BMW Only"),
        Shop {
            services: Some("honda honda honda".into()),
            ..named("Repeated Honda")
        },
    ];
    let brands = PersonalizationContext::from_brands(["honda", "bmw"]);
    let result = apply_filters(&shops, &FilterCriteria::default(), &brands);
    assert_eq!(
        names(&result),
        vec!["Both Brands", "Honda Only", "BMW Only", "Repeated Honda"]
    );
}

#[test]
fn specialties_count_for_matching_but_not_for_rank() {
    let shops = vec![
        Shop {
            specialties: Some("Ducati specialists".into()),
            ..named("Specialist")
        },
        named("Ducati House"),
    ];
    let brands = PersonalizationContext::from_brands(["ducati"]);
    let result = apply_filters(&shops, &FilterCriteria::default(), &brands);
    assert_eq!(names(&result), vec!["Ducati House", "Specialist"]);
}

#[test]
fn personalization_combines_with_explicit_filters() {
    let shops = vec![
        shop("Honda Roma", "Italy", "Roma", "Dealer", "4"),
        shop("Honda Berlin", "Germany", "Berlin", "Dealer", "4"),
        shop("Roma Generic", "Italy", "Roma", "Dealer", "4"),
    ];
    let criteria = FilterCriteria {
        country: Some("Italy".into()),
        ..FilterCriteria::default()
    };
    let brands = PersonalizationContext::from_brands(["honda"]);
    let result = apply_filters(&shops, &criteria, &brands);
    assert_eq!(names(&result), vec!["Honda Roma"]);
}

/// Checks every shop against every predicate independently, for a grid of
/// criteria, and compares with the engine's output.
#[test]
fn result_is_exactly_the_shops_passing_every_predicate() {
    let shops = catalog();
    let searches = ["", "moto", "ROMA", "street", "zzz"];
    let countries = [None, Some("Germany"), Some("Italy"), Some("")];
    let cities = [None, Some("Berlin"), Some("Roma")];
    let types = [None, Some("repair"), Some("DEALER "), Some("parts")];
    let brand_sets: [&[&str]; 3] = [&[], &["moto"], &["roma", "garage"]];

    for search in searches {
        for country in countries {
            for city in cities {
                for business_type in types {
                    for brands in brand_sets {
                        let criteria = FilterCriteria {
                            search: search.into(),
                            country: country.map(Into::into),
                            city: city.map(Into::into),
                            business_type: business_type.map(Into::into),
                        };
                        let ctx = PersonalizationContext::from_brands(brands.iter().copied());
                        let result = apply_filters(&shops, &criteria, &ctx);

                        let expected: Vec<&Shop> = shops
                            .iter()
                            .filter(|s| passes_by_hand(s, &criteria, brands))
                            .collect();

                        assert_eq!(result.len(), expected.len(), "criteria: {criteria:?}");
                        for s in &expected {
                            assert!(
                                result.iter().any(|r| std::ptr::eq(r, *s)),
                                "missing {:?} for {criteria:?}",
                                s.name
                            );
                        }
                    }
                }
            }
        }
    }
}

fn passes_by_hand(shop: &Shop, criteria: &FilterCriteria, brands: &[&str]) -> bool {
    let lower = |v: &Option<String>| v.as_deref().map(str::to_lowercase);
    let search_ok = criteria.search.trim().is_empty() || {
        let term = criteria.search.to_lowercase();
        [
            lower(&shop.name),
            lower(&shop.city),
            lower(&shop.country),
            lower(&shop.business_type),
            lower(&shop.address),
        ]
        .iter()
        .flatten()
        .any(|f| f.contains(&term))
    };
    let country_ok = match criteria.country.as_deref() {
        Some(c) if !c.trim().is_empty() => shop.country.as_deref() == Some(c),
        _ => true,
    };
    let city_ok = match criteria.city.as_deref() {
        Some(c) if !c.trim().is_empty() => shop.city.as_deref() == Some(c),
        _ => true,
    };
    let type_ok = match criteria.business_type.as_deref() {
        Some(t) if !t.trim().is_empty() => shop
            .business_type
            .as_deref()
            .is_some_and(|b| b.trim().to_lowercase() == t.trim().to_lowercase()),
        _ => true,
    };
    let brand_ok = brands.is_empty() || {
        let text = format!(
            "{} {} {} {}",
            shop.name.as_deref().unwrap_or_default(),
            shop.services.as_deref().unwrap_or_default(),
            shop.description.as_deref().unwrap_or_default(),
            shop.specialties.as_deref().unwrap_or_default()
        )
        .to_lowercase();
        brands.iter().any(|b| text.contains(b))
    };
    search_ok && country_ok && city_ok && type_ok && brand_ok
}

#[test]
fn ranked_output_is_sorted_and_stable() {
    let shops = vec![
        named("one honda"),
        named("honda bmw first"),
        named("two honda"),
        named("bmw honda second"),
        named("three bmw"),
    ];
    let brands = PersonalizationContext::from_brands(["honda", "bmw"]);
    let result = apply_filters(&shops, &FilterCriteria::default(), &brands);

    let hits: Vec<usize> = result
        .iter()
        .map(|s| brands.hits_in(&s.name.as_deref().unwrap_or_default().to_lowercase()))
        .collect();
    assert!(hits.windows(2).all(|w| w[0] >= w[1]), "hits: {hits:?}");
    assert_eq!(
        names(&result),
        vec![
            "honda bmw first",
            "bmw honda second",
            "one honda",
            "two honda",
            "three bmw"
        ]
    );
}
