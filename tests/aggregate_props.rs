use superstore::aggregate::{
    Ratio, SortOrder, count_by, dual_metric_group, rank_top_n, ratio_by, sum_by,
};
use superstore::models::{Dimension, Metric, RawOrder, RawTable, Table};
use superstore::storage::normalize;
use superstore::Error;

fn order(date: &str, cat: &str, sub: &str, product: &str, sales: f64, profit: f64, qty: u64) -> RawOrder {
    RawOrder {
        order_date: date.into(),
        sales,
        profit,
        quantity: qty,
        category: cat.into(),
        sub_category: sub.into(),
        segment: "Consumer".into(),
        product_name: product.into(),
        ship_mode: "Standard Class".into(),
    }
}

fn table(rows: Vec<RawOrder>) -> Table {
    normalize(RawTable::from(rows)).unwrap()
}

fn sample() -> Table {
    table(vec![
        order("2016-01-05", "A", "A1", "P1", 10.0, 5.0, 1),
        order("2016-01-20", "A", "A2", "P2", 20.0, -5.0, 2),
        order("2016-02-03", "B", "B1", "P1", 5.0, 5.0, 4),
        order("2016-03-11", "C", "C1", "P3", 7.5, 0.0, 3),
    ])
}

#[test]
fn sum_by_category_matches_worked_example() {
    let t = table(vec![
        order("2016-01-01", "A", "x", "p", 10.0, 5.0, 1),
        order("2016-01-01", "A", "x", "p", 20.0, -5.0, 1),
        order("2016-01-01", "B", "x", "p", 5.0, 5.0, 1),
    ]);
    let sales = sum_by(&t, &[Dimension::Category], Metric::Sales).unwrap();
    assert_eq!(sales.rows.len(), 2);
    assert_eq!(sales.get(&["A"]), Some(30.0));
    assert_eq!(sales.get(&["B"]), Some(5.0));

    let profit = sum_by(&t, &[Dimension::Category], Metric::Profit).unwrap();
    assert_eq!(profit.get(&["A"]), Some(0.0));
    assert_eq!(profit.get(&["B"]), Some(5.0));
}

#[test]
fn sum_by_keeps_one_row_per_group_and_preserves_total() {
    let t = sample();
    for dim in Dimension::ALL {
        for metric in [Metric::Sales, Metric::Profit, Metric::Quantity] {
            let s = sum_by(&t, &[dim], metric).unwrap();
            let distinct: std::collections::BTreeSet<&str> =
                t.rows().iter().map(|o| dim.value(o)).collect();
            assert_eq!(s.rows.len(), distinct.len(), "{dim} / {metric}");
            let expected: f64 = t.rows().iter().map(|o| metric.value(o)).sum();
            assert!((s.total() - expected).abs() < 1e-9, "{dim} / {metric}");
        }
    }
}

#[test]
fn period_grouping_uses_year_month() {
    let s = sum_by(&sample(), &[Dimension::Period], Metric::Sales).unwrap();
    let keys: Vec<String> = s.rows.iter().map(|r| r.key.to_string()).collect();
    assert_eq!(keys, ["2016-01", "2016-02", "2016-03"]);
    assert_eq!(s.get(&["2016-01"]), Some(30.0));
}

#[test]
fn two_dimension_grouping() {
    let s = sum_by(&sample(), &[Dimension::Category, Dimension::SubCategory], Metric::Profit).unwrap();
    assert_eq!(s.rows.len(), 4);
    assert_eq!(s.get(&["A", "A2"]), Some(-5.0));
}

#[test]
fn rank_top_n_picks_largest_quantity() {
    let t = table(vec![
        order("2016-01-01", "A", "x", "P1", 1.0, 1.0, 3),
        order("2016-01-01", "A", "x", "P2", 1.0, 1.0, 7),
    ]);
    let top = rank_top_n(&t, &[Dimension::ProductName], Metric::Quantity, 1, SortOrder::Descending).unwrap();
    assert_eq!(top.rows.len(), 1);
    assert_eq!(top.rows[0].key.to_string(), "P2");
    assert_eq!(top.rows[0].value, 7.0);
}

#[test]
fn rank_top_n_is_sorted_subset_and_bounded() {
    let t = sample();
    let all = sum_by(&t, &[Dimension::ProductName], Metric::Sales).unwrap();
    for n in 1..=5 {
        let top = rank_top_n(&t, &[Dimension::ProductName], Metric::Sales, n, SortOrder::Descending).unwrap();
        assert_eq!(top.rows.len(), n.min(all.rows.len()));
        assert!(top.rows.windows(2).all(|w| w[0].value >= w[1].value));
        assert!(top.rows.iter().all(|r| all.rows.contains(r)));
    }
    let bottom = rank_top_n(&t, &[Dimension::ProductName], Metric::Sales, 2, SortOrder::Ascending).unwrap();
    assert!(bottom.rows.windows(2).all(|w| w[0].value <= w[1].value));
    assert_eq!(bottom.rows[0].key.to_string(), "P3");
}

#[test]
fn rank_ties_keep_key_order() {
    let t = table(vec![
        order("2016-01-01", "A", "x", "Zeta", 5.0, 0.0, 1),
        order("2016-01-01", "A", "x", "Alpha", 5.0, 0.0, 1),
        order("2016-01-01", "A", "x", "Mid", 5.0, 0.0, 1),
    ]);
    let top = rank_top_n(&t, &[Dimension::ProductName], Metric::Sales, 2, SortOrder::Descending).unwrap();
    let keys: Vec<String> = top.rows.iter().map(|r| r.key.to_string()).collect();
    assert_eq!(keys, ["Alpha", "Mid"]);
}

#[test]
fn rank_rejects_zero_and_unknown_columns() {
    let t = sample();
    assert!(matches!(
        rank_top_n(&t, &[Dimension::ProductName], Metric::Sales, 0, SortOrder::Descending),
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!("discount".parse::<Metric>(), Err(Error::InvalidInput(_))));
    assert!(matches!("customer_id".parse::<Dimension>(), Err(Error::InvalidInput(_))));
}

#[test]
fn ratio_is_exact_or_undefined() {
    let t = sample();
    let r = ratio_by(&t, &[Dimension::Category], Metric::Sales, Metric::Profit).unwrap();
    assert_eq!(r.rows.len(), 3);
    let by_key = |k: &str| r.rows.iter().find(|row| row.key.to_string() == k).unwrap();
    // A: profits cancel out, C: zero profit.
    assert_eq!(by_key("A").ratio, Ratio::Undefined);
    assert_eq!(by_key("C").ratio, Ratio::Undefined);
    assert_eq!(by_key("B").ratio, Ratio::Defined(1.0));
    assert_eq!(by_key("B").numerator, 5.0);
}

#[test]
fn dual_metric_group_sums_both_metrics() {
    let t = sample();
    let d = dual_metric_group(&t, &[Dimension::Category], [Metric::Sales, Metric::Profit]).unwrap();
    assert_eq!(d.rows.len(), 3);
    assert_eq!(d.rows[0].key.to_string(), "A");
    assert_eq!(d.rows[0].values, [30.0, 0.0]);
    assert!(matches!(
        dual_metric_group(&t, &[Dimension::Category], [Metric::Sales, Metric::Sales]),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn count_by_counts_rows() {
    let c = count_by(&sample(), &[Dimension::Category]).unwrap();
    assert_eq!(c.get(&["A"]), Some(2.0));
    assert_eq!(c.total(), 4.0);
}

#[test]
fn empty_table_yields_empty_results() {
    let t = Table::default();
    let dims = [Dimension::Segment];
    assert!(sum_by(&t, &dims, Metric::Sales).unwrap().rows.is_empty());
    assert!(count_by(&t, &dims).unwrap().rows.is_empty());
    assert!(rank_top_n(&t, &dims, Metric::Sales, 10, SortOrder::Descending).unwrap().rows.is_empty());
    assert!(ratio_by(&t, &dims, Metric::Sales, Metric::Profit).unwrap().rows.is_empty());
    assert!(dual_metric_group(&t, &dims, [Metric::Sales, Metric::Profit]).unwrap().rows.is_empty());
}
