//! Feature builder: per-item sales aggregates merged onto the item master.
//!
//! Group-by is a single hash pass over the transactions; the merge is a
//! left join driven by item master order, so every master item yields
//! exactly one row and unmatched items get zero aggregates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use stockwise_core::InventoryId;
use stockwise_inventory::item::columns as item_cols;
use stockwise_inventory::{InventoryItem, ItemMaster, SalesTransaction};

/// Names of the sales-derived feature columns.
pub mod columns {
    pub const TOTAL_SALES_QUANTITY: &str = "TotalSalesQuantity";
    pub const AVG_SALES_QUANTITY: &str = "AvgSalesQuantity";
    pub const STD_SALES_QUANTITY: &str = "StdSalesQuantity";
    pub const AVG_SALES_PRICE: &str = "AvgSalesPrice";
    pub const STD_SALES_PRICE: &str = "StdSalesPrice";
    pub const TOTAL_SALES_DOLLARS: &str = "TotalSalesDollars";
    pub const DAYS_OF_STOCK: &str = "DaysOfStock";
    pub const PROFIT_MARGIN: &str = "ProfitMargin";
    pub const SALES_VARIABILITY: &str = "SalesVariability";
}

/// Columns divided by [`RESCALE_DIVISOR`] before prediction, when present.
pub const RESCALED_COLUMNS: [&str; 3] = [
    columns::TOTAL_SALES_DOLLARS,
    item_cols::PURCHASE_PRICE,
    "Quantity",
];

/// Monetary/quantity rescale the demand model was trained with.
pub const RESCALE_DIVISOR: f64 = 1000.0;

/// Summary statistics of one item's sales history.
///
/// Missing observations are skipped; a statistic with too few observations is 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SalesAggregate {
    pub total_quantity: f64,
    pub avg_quantity: f64,
    pub std_quantity: f64,
    pub avg_price: f64,
    pub std_price: f64,
    pub total_dollars: f64,
}

#[derive(Default)]
struct Observations {
    quantity: Vec<f64>,
    price: Vec<f64>,
    dollars: Vec<f64>,
}

fn observe(into: &mut Vec<f64>, value: Option<f64>) {
    if let Some(v) = value.filter(|v| !v.is_nan()) {
        into.push(v);
    }
}

/// Group transactions by item and compute their aggregates.
pub fn aggregate_sales(sales: &[SalesTransaction]) -> HashMap<InventoryId, SalesAggregate> {
    let mut groups: HashMap<&InventoryId, Observations> = HashMap::new();
    for tx in sales {
        let obs = groups.entry(&tx.inventory_id).or_default();
        observe(&mut obs.quantity, tx.quantity);
        observe(&mut obs.price, tx.price);
        observe(&mut obs.dollars, tx.dollars);
    }

    groups
        .into_iter()
        .map(|(id, obs)| {
            let avg_quantity = mean(&obs.quantity);
            let avg_price = mean(&obs.price);
            let agg = SalesAggregate {
                total_quantity: obs.quantity.iter().sum(),
                avg_quantity,
                std_quantity: stddev_sample(&obs.quantity, avg_quantity),
                avg_price,
                std_price: stddev_sample(&obs.price, avg_price),
                total_dollars: obs.dollars.iter().sum(),
            };
            (id.clone(), agg)
        })
        .collect()
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / (xs.len() as f64)
}

/// Sample standard deviation (n-1); 0 for fewer than two observations.
fn stddev_sample(xs: &[f64], mean: f64) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let var = xs
        .iter()
        .map(|x| {
            let d = x - mean;
            d * d
        })
        .sum::<f64>()
        / ((xs.len() - 1) as f64);
    var.sqrt()
}

/// `numerator / denominator`, or 0 when the denominator is not positive.
pub fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

/// One item's features, aligned with [`FeatureTable::columns`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub inventory_id: InventoryId,
    pub description: String,
    /// On-hand quantity (never rescaled).
    pub current_stock: f64,
    pub lead_time: f64,
    values: Vec<f64>,
}

impl FeatureRow {
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Ordered feature rows sharing one column list.
///
/// Every value is finite: missing, infinite and undefined values are 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value of `column` in row `row`.
    pub fn value(&self, row: usize, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r.values[idx])
    }
}

/// Build the feature table for every item of the master table, in master order.
pub fn build_features(master: &ItemMaster, sales: &[SalesTransaction]) -> FeatureTable {
    let aggregates = aggregate_sales(sales);

    let mut column_names: Vec<String> = [
        item_cols::ON_HAND,
        item_cols::AVG_PRICE,
        item_cols::PURCHASE_PRICE,
        item_cols::LEAD_TIME,
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();
    column_names.extend(master.attribute_columns().iter().cloned());
    column_names.extend(
        [
            columns::TOTAL_SALES_QUANTITY,
            columns::AVG_SALES_QUANTITY,
            columns::STD_SALES_QUANTITY,
            columns::AVG_SALES_PRICE,
            columns::STD_SALES_PRICE,
            columns::TOTAL_SALES_DOLLARS,
            columns::DAYS_OF_STOCK,
            columns::PROFIT_MARGIN,
            columns::SALES_VARIABILITY,
        ]
        .iter()
        .map(|c| c.to_string()),
    );

    let rescaled: Vec<usize> = RESCALED_COLUMNS
        .iter()
        .filter_map(|name| column_names.iter().position(|c| c == name))
        .collect();

    let mut matched = 0usize;
    let rows = master
        .items()
        .iter()
        .map(|item| {
            let agg = match aggregates.get(&item.inventory_id) {
                Some(agg) => {
                    matched += 1;
                    *agg
                }
                None => SalesAggregate::default(),
            };
            feature_row(item, &agg, &rescaled)
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        items = rows.len(),
        with_sales = matched,
        columns = column_names.len(),
        "built feature table"
    );

    FeatureTable {
        columns: column_names,
        rows,
    }
}

fn feature_row(item: &InventoryItem, agg: &SalesAggregate, rescaled: &[usize]) -> FeatureRow {
    // Missing cells stay NaN until sanitized, so a ratio that touches one becomes 0.
    let on_hand = item.on_hand.unwrap_or(f64::NAN);
    let avg_price = item.avg_price.unwrap_or(f64::NAN);
    let purchase_price = item.purchase_price.unwrap_or(f64::NAN);
    let lead_time = item.lead_time.unwrap_or(f64::NAN);

    let days_of_stock = guarded_ratio(on_hand, agg.avg_quantity);
    let profit_margin = guarded_ratio(avg_price - purchase_price, avg_price);
    let sales_variability = guarded_ratio(agg.std_quantity, agg.avg_quantity);

    let mut values = Vec::with_capacity(13 + item.attributes.len());
    values.extend([on_hand, avg_price, purchase_price, lead_time]);
    values.extend(item.attributes.iter().map(|v| v.unwrap_or(f64::NAN)));
    values.extend([
        agg.total_quantity,
        agg.avg_quantity,
        agg.std_quantity,
        agg.avg_price,
        agg.std_price,
        agg.total_dollars,
        days_of_stock,
        profit_margin,
        sales_variability,
    ]);

    for v in values.iter_mut() {
        *v = finite_or_zero(*v);
    }
    for &idx in rescaled {
        values[idx] /= RESCALE_DIVISOR;
    }

    FeatureRow {
        inventory_id: item.inventory_id.clone(),
        description: item.description.clone(),
        current_stock: values[0],
        lead_time: values[3],
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(s: &str) -> InventoryId {
        s.parse().unwrap()
    }

    fn sale(item: &str, quantity: f64, price: f64) -> SalesTransaction {
        SalesTransaction::new(id(item), quantity, price)
    }

    fn scenario_master() -> ItemMaster {
        ItemMaster::new(
            vec!["Quantity".to_string()],
            vec![
                InventoryItem {
                    attributes: vec![Some(750.0)],
                    ..InventoryItem::new(id("A1"), "Premium Vodka")
                        .with_on_hand(50.0)
                        .with_prices(20.0, 12.0)
                        .with_lead_time(5.0)
                },
                InventoryItem {
                    attributes: vec![None],
                    ..InventoryItem::new(id("B2"), "Scotch Whisky")
                        .with_on_hand(5.0)
                        .with_prices(40.0, 30.0)
                        .with_lead_time(3.0)
                },
            ],
        )
        .unwrap()
    }

    fn scenario_sales() -> Vec<SalesTransaction> {
        vec![sale("A1", 8.0, 19.0), sale("A1", 10.0, 20.0), sale("A1", 12.0, 21.0)]
    }

    #[test]
    fn aggregates_use_sample_standard_deviation() {
        let aggs = aggregate_sales(&scenario_sales());
        let a1 = aggs[&id("A1")];
        assert_eq!(a1.total_quantity, 30.0);
        assert_eq!(a1.avg_quantity, 10.0);
        assert!((a1.std_quantity - 2.0).abs() < 1e-12);
        assert_eq!(a1.avg_price, 20.0);
        assert!((a1.std_price - 1.0).abs() < 1e-12);
        assert_eq!(a1.total_dollars, 8.0 * 19.0 + 10.0 * 20.0 + 12.0 * 21.0);
    }

    #[test]
    fn single_observation_has_zero_spread() {
        let aggs = aggregate_sales(&[sale("X", 4.0, 2.5)]);
        let x = aggs[&id("X")];
        assert_eq!(x.std_quantity, 0.0);
        assert_eq!(x.std_price, 0.0);
        assert_eq!(x.avg_quantity, 4.0);
    }

    #[test]
    fn missing_observations_are_skipped() {
        let mut tx = sale("X", 6.0, 1.0);
        tx.price = None;
        let aggs = aggregate_sales(&[tx, sale("X", 2.0, 3.0)]);
        let x = aggs[&id("X")];
        assert_eq!(x.avg_quantity, 4.0);
        assert_eq!(x.avg_price, 3.0);
    }

    #[test]
    fn every_master_item_appears_once_in_order() {
        let table = build_features(&scenario_master(), &scenario_sales());
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].inventory_id, id("A1"));
        assert_eq!(table.rows()[1].inventory_id, id("B2"));
    }

    #[test]
    fn derived_ratios_and_rescale() {
        let table = build_features(&scenario_master(), &scenario_sales());

        assert_eq!(table.value(0, columns::DAYS_OF_STOCK), Some(5.0));
        assert_eq!(table.value(0, columns::PROFIT_MARGIN), Some(0.4));
        assert!((table.value(0, columns::SALES_VARIABILITY).unwrap() - 0.2).abs() < 1e-12);

        // Rescaled after the margin was computed from the raw purchase price.
        assert_eq!(table.value(0, item_cols::PURCHASE_PRICE), Some(0.012));
        assert_eq!(table.value(0, "Quantity"), Some(0.75));
        assert_eq!(table.value(0, columns::TOTAL_SALES_DOLLARS), Some(0.604));

        let a1 = &table.rows()[0];
        assert_eq!(a1.current_stock, 50.0);
        assert_eq!(a1.lead_time, 5.0);
    }

    #[test]
    fn items_without_sales_get_zero_aggregates() {
        let table = build_features(&scenario_master(), &scenario_sales());
        for col in [
            columns::TOTAL_SALES_QUANTITY,
            columns::AVG_SALES_QUANTITY,
            columns::STD_SALES_QUANTITY,
            columns::AVG_SALES_PRICE,
            columns::STD_SALES_PRICE,
            columns::TOTAL_SALES_DOLLARS,
            columns::DAYS_OF_STOCK,
            columns::SALES_VARIABILITY,
        ] {
            assert_eq!(table.value(1, col), Some(0.0), "{col}");
        }
        assert_eq!(table.value(1, "Quantity"), Some(0.0));
        assert_eq!(table.value(1, columns::PROFIT_MARGIN), Some(0.25));
    }

    #[test]
    fn missing_purchase_price_zeroes_margin() {
        let master = ItemMaster::from_items(vec![InventoryItem {
            purchase_price: None,
            ..InventoryItem::new(id("P"), "x").with_prices(10.0, 0.0)
        }])
        .unwrap();
        let table = build_features(&master, &[]);
        assert_eq!(table.value(0, columns::PROFIT_MARGIN), Some(0.0));
        assert_eq!(table.rows()[0].current_stock, 0.0);
    }

    #[test]
    fn infinite_inputs_are_coerced_to_zero() {
        let master = ItemMaster::from_items(vec![
            InventoryItem::new(id("I"), "x")
                .with_on_hand(f64::INFINITY)
                .with_prices(1.0, 0.5),
        ])
        .unwrap();
        let table = build_features(&master, &[sale("I", 2.0, 1.0)]);
        assert_eq!(table.rows()[0].current_stock, 0.0);
        assert_eq!(table.value(0, columns::DAYS_OF_STOCK), Some(0.0));
        assert!(table.rows()[0].values().iter().all(|v| v.is_finite()));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: without positive average quantity, stock cover and variability are 0.
        #[test]
        fn zero_average_quantity_zeroes_ratios(
            on_hand in -1_000.0f64..1_000.0,
            quantities in prop::collection::vec(prop_oneof![Just(0.0f64), Just(-3.0f64), Just(3.0f64)], 0..6),
        ) {
            let master = ItemMaster::from_items(vec![
                InventoryItem::new(id("Z"), "z").with_on_hand(on_hand).with_prices(1.0, 1.0),
            ]).unwrap();
            let sales: Vec<_> = quantities.iter().map(|q| sale("Z", *q, 1.0)).collect();
            let table = build_features(&master, &sales);
            let avg = table.value(0, columns::AVG_SALES_QUANTITY).unwrap();
            if avg <= 0.0 {
                prop_assert_eq!(table.value(0, columns::DAYS_OF_STOCK), Some(0.0));
                prop_assert_eq!(table.value(0, columns::SALES_VARIABILITY), Some(0.0));
            }
        }

        /// Property: a non-positive average price always yields a zero margin.
        #[test]
        fn non_positive_price_zeroes_margin(
            avg_price in -100.0f64..=0.0,
            purchase_price in -100.0f64..100.0,
        ) {
            let master = ItemMaster::from_items(vec![
                InventoryItem::new(id("M"), "m").with_prices(avg_price, purchase_price),
            ]).unwrap();
            let table = build_features(&master, &[]);
            prop_assert_eq!(table.value(0, columns::PROFIT_MARGIN), Some(0.0));
        }

        /// Property: every feature value is finite.
        #[test]
        fn feature_values_are_finite(
            on_hand in prop::num::f64::ANY,
            avg_price in prop::num::f64::ANY,
            quantity in prop::num::f64::ANY,
        ) {
            let master = ItemMaster::from_items(vec![
                InventoryItem::new(id("F"), "f").with_on_hand(on_hand).with_prices(avg_price, 1.0),
            ]).unwrap();
            let table = build_features(&master, &[sale("F", quantity, 1.0)]);
            prop_assert!(table.rows()[0].values().iter().all(|v| v.is_finite()));
        }
    }
}
