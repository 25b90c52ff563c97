mod common;

use common::{model, source, specs, TAG_A, TAG_B};
use facetnav::{
    Choice, FacetConfig, FacetError, FieldFilterSpec, FilterKind, FilterOptions, FilterSet,
    Granularity, LinkType, Params, RebaseMode, RenderedFilter,
};

fn rendered(params: &str) -> Vec<RenderedFilter> {
    let source = source();
    FilterSet::build(&specs(), &model())
        .unwrap()
        .render_all(&source, &source.all(), &Params::decode(params))
        .unwrap()
}

fn field<'a>(filters: &'a [RenderedFilter], name: &str) -> &'a RenderedFilter {
    filters.iter().find(|f| f.field == name).unwrap()
}

fn summary(choices: &[Choice]) -> Vec<(&str, LinkType, Option<usize>)> {
    choices
        .iter()
        .map(|c| (c.label.as_str(), c.link_type, c.count))
        .collect()
}

#[test]
fn test_status_counts_then_selection() {
    let filters = rendered("");
    assert_eq!(
        summary(&field(&filters, "status").choices),
        vec![
            ("open", LinkType::Add, Some(6)),
            ("closed", LinkType::Add, Some(4)),
        ]
    );

    let source = source();
    let set = FilterSet::build(&specs(), &model()).unwrap();
    let params = Params::decode("status=open");
    let rows = set.apply_all(&source, &source.all(), &params).unwrap();
    assert_eq!(rows.len(), 6);

    let filters = set.render_all(&source, &source.all(), &params).unwrap();
    let status = field(&filters, "status");
    assert_eq!(summary(&status.choices), vec![("open", LinkType::Remove, None)]);
    assert!(status.choices[0].params.is_empty());
}

#[test]
fn test_tags_overlap_and_selection() {
    let filters = rendered("");
    assert_eq!(
        summary(&field(&filters, "tags").choices),
        vec![("A", LinkType::Add, Some(3)), ("B", LinkType::Add, Some(2))]
    );

    let source = source();
    let set = FilterSet::build(&specs(), &model()).unwrap();
    let params = Params::decode(&format!("tags={TAG_A}"));
    assert_eq!(set.apply_all(&source, &source.all(), &params).unwrap().len(), 3);

    let filters = set.render_all(&source, &source.all(), &params).unwrap();
    let tags = field(&filters, "tags");
    assert_eq!(
        summary(&tags.choices),
        vec![("A", LinkType::Remove, None), ("B", LinkType::Add, Some(2))]
    );
    assert_eq!(tags.choices[1].params.get("tags"), vec!["1", "2"]);

    // following the ADD link intersects both tags
    let both = set
        .apply_all(&source, &source.all(), &tags.choices[1].params)
        .unwrap();
    assert_eq!(both.len(), 1);
}

#[test]
fn test_single_remaining_value_is_only_choice() {
    let filters = rendered(&format!("tags={TAG_B}"));
    let status = field(&filters, "status");
    assert_eq!(summary(&status.choices), vec![("open", LinkType::OnlyChoice, None)]);
    assert!(!status.choices[0].is_link());
    assert_eq!(status.only_choices().count(), 1);
}

#[test]
fn test_apply_all_is_idempotent() {
    let source = source();
    let set = FilterSet::build(&specs(), &model()).unwrap();
    for raw in [
        "",
        "status=open",
        "tags=1&tags=2",
        "author=3&lang=en",
        "published__year=2021&published__month=5",
        "status=bogus&published__month=13",
    ] {
        let params = Params::decode(raw);
        let once = set.apply_all(&source, &source.all(), &params).unwrap();
        let twice = set.apply_all(&source, &once, &params).unwrap();
        assert_eq!(once, twice, "re-applying {raw:?} narrowed further");
    }
}

#[test]
fn test_more_selections_never_widen() {
    let source = source();
    let set = FilterSet::build(&specs(), &model()).unwrap();
    let chain = [
        "",
        "lang=en",
        "lang=en&published__year=2020",
        "lang=en&published__year=2020&status=open",
        "lang=en&published__year=2020&status=open&tags=1",
        "lang=en&published__year=2020&status=open&tags=1&tags=2",
    ];
    let sizes: Vec<usize> = chain
        .iter()
        .map(|raw| {
            set.apply_all(&source, &source.all(), &Params::decode(raw))
                .unwrap()
                .len()
        })
        .collect();
    assert!(sizes.windows(2).all(|w| w[1] <= w[0]), "sizes: {sizes:?}");
    assert_eq!(sizes[0], 10);
    assert_eq!(*sizes.last().unwrap(), 0);
}

#[test]
fn test_params_round_trip_through_query_string() {
    let stores = vec![
        Params::new(),
        Params::decode("tags=1&tags=2&tags=1"),
        [("q", "rust & go"), ("path", "a/b?c=d"), ("name", "Zoë"), ("empty", "")]
            .into_iter()
            .collect(),
    ];
    for store in stores {
        assert_eq!(Params::decode(&store.encode()), store);
    }
}

#[test]
fn test_every_value_maps_to_one_choice() {
    let source = source();
    let filters = rendered("");
    for name in ["status", "lang"] {
        let facet = field(&filters, name);
        assert_eq!(facet.remove_choices().count(), 0);
        assert_eq!(facet.only_choices().count(), 0);
        let total: usize = facet.add_choices().filter_map(|c| c.count).sum();
        assert_eq!(total, source.all().len(), "{name} counts");
    }

    let labels: Vec<_> = field(&filters, "lang")
        .choices
        .iter()
        .map(|c| c.label.clone())
        .collect();
    assert_eq!(labels, vec!["English", "French"]);
}

#[test]
fn test_choice_links_select_what_they_say() {
    let source = source();
    let set = FilterSet::build(&specs(), &model()).unwrap();
    let filters = set.render_all(&source, &source.all(), &Params::new()).unwrap();
    for facet in &filters {
        for choice in facet.add_choices() {
            let rows = set
                .apply_all(&source, &source.all(), &choice.params)
                .unwrap();
            assert_eq!(
                Some(rows.len()),
                choice.count,
                "{} / {}",
                facet.field,
                choice.label
            );
        }
    }
}

#[test]
fn test_temporal_drill_down() {
    let filters = rendered("");
    let published = field(&filters, "published");
    assert_eq!(published.label, "Publication date");
    assert_eq!(
        summary(&published.choices),
        vec![
            ("2020", LinkType::Add, Some(4)),
            ("2021", LinkType::Add, Some(4)),
            ("2019", LinkType::Add, Some(1)),
            ("2022", LinkType::Add, Some(1)),
        ]
    );
    assert_eq!(published.choices[0].query_string(), "?published__year=2020");

    let filters = rendered("published__year=2020");
    assert_eq!(
        summary(&field(&filters, "published").choices),
        vec![
            ("2020", LinkType::Remove, None),
            ("January 2020", LinkType::Add, Some(2)),
            ("February 2020", LinkType::Add, Some(2)),
        ]
    );

    let filters = rendered("published__year=2020&published__month=1");
    assert_eq!(
        summary(&field(&filters, "published").choices),
        vec![
            ("2020", LinkType::Remove, None),
            ("January 2020", LinkType::Remove, None),
            ("5 January 2020", LinkType::OnlyChoice, None),
        ]
    );
}

#[test]
fn test_coarser_selection_clears_finer_levels() {
    let filters = rendered("published__year=2020&published__month=2&published__day=10&lang=en");
    let published = field(&filters, "published");
    let removes: Vec<_> = published.remove_choices().collect();
    assert_eq!(removes.len(), 3);
    assert_eq!(removes[0].params.encode(), "lang=en");
    assert_eq!(removes[1].params.encode(), "published__year=2020&lang=en");

    // stale finer levels without a year are ignored and replaced
    let filters = rendered("published__month=2&published__day=10");
    let published = field(&filters, "published");
    assert_eq!(published.remove_choices().count(), 0);
    for choice in published.add_choices() {
        assert_eq!(choice.params.len(), 1);
        assert!(choice.params.contains_key("published__year"));
    }
}

#[test]
fn test_depth_limits_temporal_levels() {
    let source = source();
    let specs = vec![FieldFilterSpec::new("published").options(FilterOptions {
        max_depth: Some(Granularity::Year),
        ..Default::default()
    })];
    let set = FilterSet::build(&specs, &model()).unwrap();
    let filters = set
        .render_all(&source, &source.all(), &Params::decode("published__year=2021"))
        .unwrap();
    assert_eq!(
        summary(&filters[0].choices),
        vec![("2021", LinkType::Remove, None)]
    );
}

#[test]
fn test_malformed_values_show_everything() {
    let source = source();
    let set = FilterSet::build(&specs(), &model()).unwrap();
    let params = Params::decode("author=ada&tags=x&published__year=20x0&lang=de");
    let rows = set.apply_all(&source, &source.all(), &params).unwrap();
    assert_eq!(rows.len(), 10);

    let filters = set.render_all(&source, &source.all(), &params).unwrap();
    assert!(filters.iter().all(|f| f.remove_choices().count() == 0));
}

#[test]
fn test_well_formed_values_without_records_stay_selected() {
    let source = source();
    let set = FilterSet::build(&specs(), &model()).unwrap();

    let params = Params::decode("status=archived&author=999");
    let eval = set.evaluate(&source, &source.all(), &params).unwrap();
    assert_eq!(eval.total, 0);
    assert_eq!(
        summary(&field(&eval.filters, "status").choices),
        vec![("archived", LinkType::Remove, None)]
    );
    let author = field(&eval.filters, "author");
    assert_eq!(summary(&author.choices), vec![("999", LinkType::Remove, None)]);
    assert_eq!(author.choices[0].params.encode(), "status=archived");

    // outside a declared domain the value is ignored instead
    let eval = set
        .evaluate(&source, &source.all(), &Params::decode("lang=de"))
        .unwrap();
    assert_eq!(eval.total, 10);
    assert_eq!(field(&eval.filters, "lang").remove_choices().count(), 0);
}

#[test]
fn test_evaluate_reports_total() {
    let source = source();
    let set = FilterSet::build(&specs(), &model()).unwrap();
    let params = Params::decode("status=open&lang=en");
    let eval = set.evaluate(&source, &source.all(), &params).unwrap();
    // articles 1, 2, 4 and 5
    assert_eq!(eval.total, 4);
    assert_eq!(eval.total, eval.collection.len());
}

#[test]
fn test_data_source_errors_reach_the_caller() {
    let source = source().with_failure_on("author");
    let set = FilterSet::build(&specs(), &model()).unwrap();
    match set.evaluate(&source, &source.all(), &Params::new()) {
        Err(FacetError::DataSource(msg)) => assert!(msg.contains("author")),
        other => panic!("Expected DataSource error, got {other:?}"),
    }
    assert!(matches!(
        set.apply_all(&source, &source.all(), &Params::decode("author=1")),
        Err(FacetError::DataSource(_))
    ));
}

#[test]
fn test_configuration_errors_fail_the_build() {
    let model = model();
    assert!(matches!(
        FilterSet::build(&["missing".into()], &model),
        Err(FacetError::UnknownField(_))
    ));
    assert!(matches!(
        FilterSet::build(&[FieldFilterSpec::new("tags").kind(FilterKind::Temporal)], &model),
        Err(FacetError::Configuration(_))
    ));
    assert!(matches!(
        FilterSet::build(&[FieldFilterSpec::new("status").kind(FilterKind::Relation)], &model),
        Err(FacetError::Configuration(_))
    ));

    // a plain filter whose key collides with a temporal level key
    let specs = vec![
        FieldFilterSpec::new("published"),
        FieldFilterSpec::new("status").options(FilterOptions {
            param: Some("published__month".into()),
            ..Default::default()
        }),
    ];
    assert!(matches!(
        FilterSet::build(&specs, &model),
        Err(FacetError::Configuration(_))
    ));
}

#[test]
fn test_rebase_modes_from_config_file() {
    use std::io::Write;

    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "rebase = \"cumulative\"").unwrap();
    let config = FacetConfig::from_file(file.path()).unwrap();
    assert_eq!(config.rebase, RebaseMode::Cumulative);

    let source = source();
    let params = Params::decode("lang=fr");
    let set = FilterSet::build_with_config(&specs(), &model(), &config).unwrap();
    assert_eq!(set.rebase(), RebaseMode::Cumulative);
    let filters = set.render_all(&source, &source.all(), &params).unwrap();
    // french articles: 3 and 6 open, 9 closed
    assert_eq!(
        summary(&field(&filters, "status").choices),
        vec![
            ("open", LinkType::Add, Some(2)),
            ("closed", LinkType::Add, Some(1)),
        ]
    );
    // under cumulative rebasing the selected language is the only one left
    assert_eq!(
        summary(&field(&filters, "lang").choices),
        vec![("French", LinkType::Remove, None)]
    );

    let preceding = FacetConfig {
        rebase: RebaseMode::Preceding,
        ..Default::default()
    };
    let set = FilterSet::build_with_config(&specs(), &model(), &preceding).unwrap();
    let filters = set.render_all(&source, &source.all(), &params).unwrap();
    // lang is declared last, so status is counted over all articles
    assert_eq!(
        summary(&field(&filters, "status").choices),
        vec![
            ("open", LinkType::Add, Some(6)),
            ("closed", LinkType::Add, Some(4)),
        ]
    );
}

#[test]
fn test_filters_render_in_declared_order() {
    let source = source();
    let mut specs = specs();
    specs.reverse();
    let set = FilterSet::build(&specs, &model()).unwrap();
    let filters = set.render_all(&source, &source.all(), &Params::new()).unwrap();
    let fields: Vec<_> = filters.iter().map(|f| f.field.as_str()).collect();
    assert_eq!(fields, vec!["lang", "published", "author", "tags", "status"]);
}

#[test]
fn test_rendered_filters_serialize() {
    let filters = rendered("status=open");
    let json = serde_json::to_value(field(&filters, "status")).unwrap();
    assert_eq!(json["kind"], "values");
    assert_eq!(json["choices"][0]["link_type"], "remove");
    assert!(json["choices"][0].get("count").is_none());

    let json = serde_json::to_value(field(&filters, "author")).unwrap();
    assert_eq!(json["choices"][0]["link_type"], "add");
    assert!(json["choices"][0]["count"].is_number());
}
