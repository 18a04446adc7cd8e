use tabview::record::reference_dataset;
use tabview::{ColumnId, ExpansionMode, SortDirection, TableConfig, TableViewModel};

fn names(vm: &TableViewModel) -> Vec<&str> {
    vm.visible_page().iter().map(|r| r.name.as_str()).collect()
}

#[test]
fn global_filter_then_sort_by_calories() {
    let config = TableConfig::default().with_page_size(None);
    let mut vm = TableViewModel::new(reference_dataset(), &config);

    vm.set_sort_column(ColumnId::Calories).unwrap();
    vm.set_global_filter("e");
    // Every dessert name contains an "e", Cupcake included.
    assert_eq!(vm.total_match_count(), 5);
    assert_eq!(
        names(&vm),
        vec![
            "Frozen yoghurt",
            "Ice cream sandwich",
            "Eclair",
            "Cupcake",
            "Gingerbread"
        ]
    );
    let calories: Vec<f64> = vm
        .visible_page()
        .iter()
        .filter_map(|r| r.calories)
        .collect();
    assert_eq!(calories, vec![159.0, 237.0, 262.0, 305.0, 356.0]);

    vm.set_global_filter("er");
    assert_eq!(names(&vm), vec!["Gingerbread"]);
}

#[test]
fn filter_sort_and_page_together() {
    let config = TableConfig::default().with_expansion_mode(ExpansionMode::PerRecord);
    let mut vm = TableViewModel::new(reference_dataset(), &config);

    // Frozen yoghurt is the only record without an "a".
    vm.set_global_filter("A");
    assert_eq!(vm.total_match_count(), 4);
    vm.set_sort_column(ColumnId::Carbs).unwrap();
    vm.set_sort_direction(SortDirection::Descending);
    // carbs: Cupcake 67, Gingerbread 49, Ice cream sandwich 37, Eclair 24
    assert_eq!(names(&vm), vec!["Cupcake", "Gingerbread"]);
    vm.next_page();
    assert_eq!(names(&vm), vec!["Ice cream sandwich", "Eclair"]);

    vm.toggle_expansion(Some(2));
    vm.set_page_size(Some(10));
    assert_eq!(vm.state().page_index, 0);
    assert_eq!(vm.visible_page().len(), 4);
    assert!(vm.is_expanded(2));
}

#[test]
fn column_ids_from_text_are_checked() {
    assert_eq!("carbs".parse::<ColumnId>().unwrap(), ColumnId::Carbs);
    assert!("sugar".parse::<ColumnId>().is_err());
}
