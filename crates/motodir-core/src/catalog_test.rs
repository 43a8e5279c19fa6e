use super::*;

fn located(country: Option<&str>, city: Option<&str>) -> Shop {
    Shop {
        country: country.map(Into::into),
        city: city.map(Into::into),
        ..Shop::default()
    }
}

fn rated(rating: Option<&str>) -> Shop {
    Shop {
        rating: rating.map(Into::into),
        ..Shop::default()
    }
}

#[test]
fn unique_countries_drops_blank_dedupes_and_sorts() {
    let shops = vec![
        located(Some("Italy"), None),
        located(Some("Germany"), None),
        located(Some("  "), None),
        located(None, None),
        located(Some("Italy"), None),
        located(Some("Österreich"), None),
        located(Some("austria"), None),
    ];
    let countries = unique_countries(&shops);
    assert_eq!(countries, vec!["Germany", "Italy", "austria", "Österreich"]);
    assert!(countries.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn unique_cities_for_only_considers_exact_country() {
    let shops = vec![
        located(Some("Italy"), Some("Roma")),
        located(Some("Italy"), Some("Milano")),
        located(Some("Italy"), Some("Roma")),
        located(Some("italy"), Some("Napoli")),
        located(Some("Germany"), Some("Berlin")),
        located(Some("Italy"), Some("")),
    ];
    assert_eq!(unique_cities_for(&shops, "Italy"), vec!["Milano", "Roma"]);
    assert!(unique_cities_for(&shops, "France").is_empty());
}

#[test]
fn unique_business_types_keep_exact_spelling() {
    let shops = vec![
        Shop {
            business_type: Some("Repair".into()),
            ..Shop::default()
        },
        Shop {
            business_type: Some("repair".into()),
            ..Shop::default()
        },
        Shop {
            business_type: Some("Dealer".into()),
            ..Shop::default()
        },
    ];
    assert_eq!(
        unique_business_types(&shops),
        vec!["Dealer", "Repair", "repair"]
    );
}

#[test]
fn facet_options_carry_counts() {
    let shops = vec![
        located(Some("Italy"), Some("Roma")),
        located(Some("Italy"), Some("Roma")),
        located(Some("Italy"), Some("Milano")),
        located(Some("Germany"), Some("Berlin")),
    ];
    let countries = country_options(&shops);
    assert_eq!(
        countries,
        vec![
            FacetOption {
                value: "Germany".into(),
                count: 1
            },
            FacetOption {
                value: "Italy".into(),
                count: 3
            },
        ]
    );
    assert_eq!(countries[1].to_string(), "Italy (3)");

    let cities = city_options_for(&shops, "Italy");
    assert_eq!(cities.len(), 2);
    assert_eq!(cities[1].to_string(), "Roma (2)");
    assert!(business_type_options(&shops).is_empty());
}

#[test]
fn stats_without_parseable_ratings_report_no_data() {
    let shops = vec![rated(None), rated(Some("N/A")), rated(Some("0")), rated(Some(""))];
    let stats = compute_stats(&shops);
    assert_eq!(stats.avg_rating, AvgRating::NoData);
    assert_eq!(stats.avg_rating.to_string(), "\u{2014}");
    assert_eq!(stats.total_shops, 4);
}

#[test]
fn stats_average_over_rated_shops_only() {
    let shops = vec![rated(Some("4")), rated(Some("5"))];
    assert_eq!(compute_stats(&shops).avg_rating.to_string(), "4.5");

    let shops = vec![rated(Some("4")), rated(Some("N/A")), rated(Some("3"))];
    assert_eq!(compute_stats(&shops).avg_rating.to_string(), "3.5");
}

#[test]
fn stats_round_to_one_decimal_half_up() {
    let shops = vec![rated(Some("4.2")), rated(Some("4.3"))];
    assert_eq!(compute_stats(&shops).avg_rating, AvgRating::Value(4.3));

    let shops = vec![rated(Some("4.11")), rated(Some("4.12")), rated(Some("4.13"))];
    assert_eq!(compute_stats(&shops).avg_rating.to_string(), "4.1");
}

#[test]
fn stats_count_distinct_countries_and_cities() {
    let shops = vec![
        Shop {
            rating: Some("4".into()),
            ..located(Some("US"), Some("NY"))
        },
        Shop {
            rating: Some("3".into()),
            ..located(Some("US"), Some("LA"))
        },
        located(Some("Canada"), Some("NY")),
        located(None, Some(" ")),
    ];
    let stats = compute_stats(&shops);
    assert_eq!(stats.total_shops, 4);
    assert_eq!(stats.total_countries, 2);
    assert_eq!(stats.total_cities, 2);
    assert_eq!(stats.avg_rating.to_string(), "3.5");
}

#[test]
fn stats_round_the_stored_binary_value() {
    let shops = vec![rated(Some("4.3")), rated(Some("4.4"))];
    assert_eq!(compute_stats(&shops).avg_rating.to_string(), "4.3");

    assert!((round_to_tenth(4.25) - 4.3).abs() < f64::EPSILON);
    assert!((round_to_tenth(4.75) - 4.8).abs() < f64::EPSILON);
    assert!((round_to_tenth(4.35) - 4.3).abs() < f64::EPSILON);
    assert!((round_to_tenth(4.36) - 4.4).abs() < f64::EPSILON);
    assert!((round_to_tenth(5.0) - 5.0).abs() < f64::EPSILON);
}

#[test]
fn stats_serialize_average_as_display_text() {
    let stats = compute_stats(&[rated(Some("4")), rated(Some("5"))]);
    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["avg_rating"], "4.5");
    assert_eq!(json["total_shops"], 2);

    let empty = serde_json::to_value(compute_stats(&[rated(None)])).unwrap();
    assert_eq!(empty["avg_rating"], "\u{2014}");
}
