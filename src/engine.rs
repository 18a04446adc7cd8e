//! Pure pipeline stages: filter, sort and paginate.
//!
//! Each stage takes the previous stage's output and returns a new sequence of
//! borrowed records. Nothing here mutates a record or keeps state between calls.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::config::SortCollation;
use crate::record::{ColumnId, FieldValue, Record, SortDirection};

/// Keeps the records that pass every non-empty column filter and the global
/// filter. Matching is case-insensitive substring containment. Input order is
/// preserved.
pub fn filter<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    column_filters: &BTreeMap<ColumnId, String>,
    global_filter: &str,
) -> Vec<&'a Record> {
    let needles: Vec<(ColumnId, String)> = column_filters
        .iter()
        .filter(|(_, needle)| !needle.is_empty())
        .map(|(column, needle)| (*column, needle.to_lowercase()))
        .collect();
    let global = global_filter.to_lowercase();

    records
        .into_iter()
        .filter(|record| {
            needles.iter().all(|(column, needle)| {
                record
                    .field(*column)
                    .to_string()
                    .to_lowercase()
                    .contains(needle.as_str())
            })
        })
        .filter(|record| {
            global.is_empty() || record.search_text().to_lowercase().contains(&global)
        })
        .collect()
}

/// Stable sort on one column. Ties keep dataset order in both directions.
pub fn sort<'a>(
    mut records: Vec<&'a Record>,
    column: ColumnId,
    direction: SortDirection,
    collation: SortCollation,
) -> Vec<&'a Record> {
    records.sort_by(|a, b| {
        let ascending = compare_field(a, b, column, collation);
        let order = match direction {
            SortDirection::Ascending => ascending,
            SortDirection::Descending => ascending.reverse(),
        };
        order.then_with(|| a.id.cmp(&b.id))
    });
    records
}

fn compare_field(a: &Record, b: &Record, column: ColumnId, collation: SortCollation) -> Ordering {
    match (column, collation) {
        (ColumnId::Name, SortCollation::CaseInsensitive) => {
            FieldValue::Text(&a.sort_key).compare(&FieldValue::Text(&b.sort_key))
        }
        _ => a.field(column).compare(&b.field(column)),
    }
}

/// One page of `records`. `None` as page size returns everything; a page past
/// the end is empty.
pub fn paginate<T>(records: &[T], page_index: usize, page_size: Option<usize>) -> &[T] {
    let Some(size) = page_size else {
        return records;
    };
    let start = page_index.saturating_mul(size);
    if start >= records.len() {
        return &[];
    }
    let end = std::cmp::min(start.saturating_add(size), records.len());
    &records[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RawRecord, reference_dataset};

    fn dataset() -> Vec<Record> {
        reference_dataset()
            .into_iter()
            .enumerate()
            .map(|(id, raw)| Record::from_raw(id, raw))
            .collect()
    }

    fn sort_raw<'a>(
        records: Vec<&'a Record>,
        column: ColumnId,
        direction: SortDirection,
    ) -> Vec<&'a Record> {
        sort(records, column, direction, SortCollation::Raw)
    }

    fn names(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.name.clone()).collect()
    }

    fn ids(records: &[&Record]) -> Vec<usize> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn empty_filters_keep_everything_in_order() {
        let data = dataset();
        let out = filter(&data, &BTreeMap::new(), "");
        assert_eq!(ids(&out), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn filter_ignores_case() {
        let data = dataset();
        for needle in ["ECLAIR", "eclair"] {
            let out = filter(&data, &BTreeMap::new(), needle);
            assert_eq!(names(&out), vec!["Eclair"]);

            let by_name = BTreeMap::from([(ColumnId::Name, needle.to_string())]);
            let out = filter(&data, &by_name, "");
            assert_eq!(names(&out), vec!["Eclair"]);
        }
    }

    #[test]
    fn column_filter_matches_rendered_numbers() {
        let data = dataset();
        let fat = BTreeMap::from([(ColumnId::Fat, "16".to_string())]);
        assert_eq!(names(&filter(&data, &fat, "")), vec!["Eclair", "Gingerbread"]);

        let fat = BTreeMap::from([(ColumnId::Fat, "6.0".to_string())]);
        assert!(filter(&data, &fat, "").is_empty());
    }

    #[test]
    fn empty_needles_are_inactive() {
        let data = dataset();
        let filters = BTreeMap::from([(ColumnId::Name, String::new())]);
        assert_eq!(filter(&data, &filters, "").len(), 5);
    }

    #[test]
    fn adding_a_filter_never_grows_the_result() {
        let data = dataset();
        let mut filters = BTreeMap::new();
        let mut previous = filter(&data, &filters, "a").len();
        for (column, needle) in [
            (ColumnId::Calories, "3"),
            (ColumnId::Carbs, "4"),
            (ColumnId::Name, "g"),
        ] {
            filters.insert(column, needle.to_string());
            let count = filter(&data, &filters, "a").len();
            assert!(count <= previous);
            previous = count;
        }
        assert_eq!(previous, 1);
    }

    #[test]
    fn column_and_global_filters_combine() {
        let data = dataset();
        let carbs = BTreeMap::from([(ColumnId::Carbs, "24".to_string())]);
        assert_eq!(names(&filter(&data, &carbs, "")), vec!["Frozen yoghurt", "Eclair"]);
        assert_eq!(names(&filter(&data, &carbs, "YOG")), vec!["Frozen yoghurt"]);
    }

    #[test]
    fn sort_by_number_ascending_and_descending() {
        let data = dataset();
        let all: Vec<&Record> = data.iter().collect();

        let asc = sort_raw(all.clone(), ColumnId::Calories, SortDirection::Ascending);
        assert_eq!(ids(&asc), vec![0, 1, 2, 3, 4]);

        let desc = sort_raw(all, ColumnId::Calories, SortDirection::Descending);
        assert_eq!(ids(&desc), vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn ties_keep_dataset_order_in_both_directions() {
        let data = dataset();
        let all: Vec<&Record> = data.iter().collect();

        // fat: 6, 9, 16, 3.7, 16
        let asc = sort_raw(all.clone(), ColumnId::Fat, SortDirection::Ascending);
        assert_eq!(ids(&asc), vec![3, 0, 1, 2, 4]);
        let desc = sort_raw(all.clone(), ColumnId::Fat, SortDirection::Descending);
        assert_eq!(ids(&desc), vec![2, 4, 1, 0, 3]);

        // carbs: 24, 37, 24, 67, 49
        let desc = sort_raw(all, ColumnId::Carbs, SortDirection::Descending);
        assert_eq!(ids(&desc), vec![3, 4, 1, 0, 2]);
    }

    #[test]
    fn sorting_a_sorted_sequence_is_stable() {
        let data = dataset();
        let all: Vec<&Record> = data.iter().collect();
        let once = sort_raw(all, ColumnId::Fat, SortDirection::Descending);
        let twice = sort_raw(once.clone(), ColumnId::Fat, SortDirection::Descending);
        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn name_collation() {
        let data: Vec<Record> = ["banana", "Cherry", "apple"]
            .into_iter()
            .enumerate()
            .map(|(id, name)| {
                Record::from_raw(id, RawRecord::new(name, 0.0, 0.0, 0.0, 0.0, ""))
            })
            .collect();
        let all: Vec<&Record> = data.iter().collect();

        let raw = sort_raw(all.clone(), ColumnId::Name, SortDirection::Ascending);
        assert_eq!(names(&raw), vec!["Cherry", "apple", "banana"]);

        let folded = sort(
            all,
            ColumnId::Name,
            SortDirection::Ascending,
            SortCollation::CaseInsensitive,
        );
        assert_eq!(names(&folded), vec!["apple", "banana", "Cherry"]);
    }

    #[test]
    fn absent_values_sort_first_ascending() {
        let mut raw = RawRecord::new("Mystery", 0.0, 0.0, 0.0, 0.0, "");
        raw.calories = None;
        let mut data = dataset();
        data.push(Record::from_raw(5, raw));
        let all: Vec<&Record> = data.iter().collect();

        let asc = sort_raw(all.clone(), ColumnId::Calories, SortDirection::Ascending);
        assert_eq!(asc[0].name, "Mystery");
        let desc = sort_raw(all, ColumnId::Calories, SortDirection::Descending);
        assert_eq!(desc.last().unwrap().name, "Mystery");
    }

    #[test]
    fn pagination_bounds() {
        let data = dataset();
        let all: Vec<&Record> = data.iter().collect();

        assert!(paginate(&all, 10, Some(2)).is_empty());
        assert_eq!(ids(paginate(&all, 0, Some(2))), vec![0, 1]);
        assert_eq!(ids(paginate(&all, 2, Some(2))), vec![4]);
        assert_eq!(ids(paginate(&all, 3, None)), vec![0, 1, 2, 3, 4]);
        assert!(paginate(&all, usize::MAX, Some(usize::MAX)).is_empty());
    }
}
