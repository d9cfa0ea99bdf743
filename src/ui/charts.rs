use std::collections::BTreeMap;

use eframe::egui::{self, Align2, Color32, FontId, RichText, ScrollArea, Sense, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints};

use crate::color::{ColorMap, ramp_color};
use crate::data::aggregate::{self, AggregateRow, GroupField, Metric};
use crate::data::derive::MONTH_NAMES;
use crate::data::model::Transaction;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central dashboard panel
// ---------------------------------------------------------------------------

/// Render the KPI row and charts for the current selection.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a data file to explore sales  (File → Open…)");
        });
        return;
    };

    if state.visible_indices.is_empty() {
        // Empty selection is valid; say so instead of drawing empty charts.
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No data for this selection. Adjust the filters.");
        });
        return;
    }

    let rows: Vec<&Transaction> = state.visible_rows().collect();
    let region_colors = ColorMap::new(&dataset.regions);
    let product_colors = ColorMap::new(&dataset.products);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            kpi_row(ui, &rows);
            ui.separator();

            let by_region = aggregate::aggregate(rows.iter().copied(), &[GroupField::Region]);
            profit_bars(ui, "profit_by_region", "Profit by region", &by_region, &region_colors);
            ui.add_space(8.0);

            let by_product = aggregate::aggregate(rows.iter().copied(), &[GroupField::Product]);
            profit_bars(
                ui,
                "profit_by_product",
                "Profit by product",
                &by_product,
                &product_colors,
            );
            ui.separator();

            let pivot = aggregate::aggregate(
                rows.iter().copied(),
                &[GroupField::Product, GroupField::Region],
            );
            margin_matrix(ui, &pivot);
            ui.separator();

            let monthly = aggregate::aggregate(
                rows.iter().copied(),
                &[GroupField::Month, GroupField::Region],
            );
            monthly_trends(ui, &monthly, &region_colors);
        });
}

// ---------------------------------------------------------------------------
// KPI row
// ---------------------------------------------------------------------------

fn kpi_row(ui: &mut Ui, rows: &[&Transaction]) {
    let Some(k) = aggregate::kpis(rows.iter().copied()) else {
        return;
    };
    ui.columns(4, |cols: &mut [Ui]| {
        kpi_card(&mut cols[0], "Total units sold", group_thousands(k.units_sold_total));
        kpi_card(&mut cols[1], "Total revenue", format_gbp(k.revenue_total));
        kpi_card(&mut cols[2], "Total profit", format_gbp(k.profit_total));
        // Mean of per-row margins, not the sum-ratio the charts use.
        kpi_card(&mut cols[3], "Avg profit margin", format_pct(k.mean_profit_margin));
    });
}

fn kpi_card(ui: &mut Ui, label: &str, value: String) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new(label).small().weak());
        ui.label(RichText::new(value).heading().strong());
    });
}

// ---------------------------------------------------------------------------
// Bar charts, one per categorical dimension
// ---------------------------------------------------------------------------

fn profit_bars(ui: &mut Ui, id: &str, title: &str, groups: &[AggregateRow], colors: &ColorMap) {
    ui.strong(title);

    // Descending by profit, the order the report charts use.
    let ranked = aggregate::top_n(groups, Metric::Profit, groups.len());
    let labels: Vec<String> = ranked.iter().map(|g| g.key[0].clone()).collect();

    let bars: Vec<Bar> = ranked
        .iter()
        .enumerate()
        .map(|(i, g)| {
            Bar::new(i as f64, g.profit_total)
                .width(0.6)
                .fill(colors.color_for(&g.key[0]))
                .name(&g.key[0])
        })
        .collect();

    Plot::new(id)
        .height(220.0)
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .y_axis_label("Profit (£)")
        .x_axis_formatter(move |mark: GridMark, _range: &std::ops::RangeInclusive<f64>| {
            index_label(&labels, mark.value)
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

/// Category label for an integer-valued axis mark, blank elsewhere.
fn index_label(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 0.05 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Region × product margin matrix
// ---------------------------------------------------------------------------

/// Pivot of sum-ratio profit margins, products down, regions across.
///
/// Combinations absent from the filtered input render as a dim "–": absence
/// of data is not a zero margin, so no zero-fill.
fn margin_matrix(ui: &mut Ui, pivot: &[AggregateRow]) {
    ui.strong("Profit margin by region and product");

    let mut products: Vec<&str> = Vec::new();
    let mut regions: Vec<&str> = Vec::new();
    let mut cells: BTreeMap<(&str, &str), &AggregateRow> = BTreeMap::new();
    for g in pivot {
        let (product, region) = (g.key[0].as_str(), g.key[1].as_str());
        if !products.contains(&product) {
            products.push(product);
        }
        if !regions.contains(&region) {
            regions.push(region);
        }
        cells.insert((product, region), g);
    }
    regions.sort_unstable();

    let (lo, hi) = pivot.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), g| {
        (lo.min(g.profit_margin), hi.max(g.profit_margin))
    });

    egui::Grid::new("margin_matrix")
        .spacing([4.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for region in &regions {
                ui.strong(*region);
            }
            ui.end_row();

            for product in &products {
                ui.label(*product);
                for region in &regions {
                    match cells.get(&(*product, *region)) {
                        Some(g) => heat_cell(ui, g, lo, hi),
                        None => {
                            ui.label(RichText::new("–").weak())
                                .on_hover_text("No transactions for this combination");
                        }
                    }
                }
                ui.end_row();
            }
        });
}

fn heat_cell(ui: &mut Ui, group: &AggregateRow, lo: f64, hi: f64) {
    let color = ramp_color(group.profit_margin, lo, hi);
    let (rect, response) = ui.allocate_exact_size(egui::vec2(76.0, 22.0), Sense::hover());
    ui.painter().rect_filled(rect, 3.0, color);
    ui.painter().text(
        rect.center(),
        Align2::CENTER_CENTER,
        format_pct(group.profit_margin),
        FontId::proportional(11.0),
        Color32::BLACK,
    );
    response.on_hover_text(format!(
        "{} in {}: margin {}, revenue {}",
        group.key[0],
        group.key[1],
        format_pct(group.profit_margin),
        format_gbp(group.revenue_total),
    ));
}

// ---------------------------------------------------------------------------
// Monthly time series
// ---------------------------------------------------------------------------

fn monthly_trends(ui: &mut Ui, monthly: &[AggregateRow], colors: &ColorMap) {
    ui.strong("Monthly units sold by region");

    // Month keys sort chronologically, so each series arrives in date order.
    let mut series: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for g in monthly {
        let Some((year, month)) = aggregate::parse_month_key(&g.key[0]) else {
            continue;
        };
        let x = f64::from(year) * 12.0 + f64::from(month - 1);
        series
            .entry(g.key[1].as_str())
            .or_default()
            .push([x, g.units_sold_total as f64]);
    }

    Plot::new("monthly_units")
        .height(240.0)
        .legend(Legend::default())
        .y_axis_label("Units sold")
        .x_axis_formatter(|mark: GridMark, _range: &std::ops::RangeInclusive<f64>| {
            month_axis_label(mark.value)
        })
        .show(ui, |plot_ui| {
            for (region, points) in &series {
                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .name(region)
                        .color(colors.color_for(region))
                        .width(1.5),
                );
            }
        });
}

/// `"Apr 2003"` for an integer month index (years × 12 + month − 1).
fn month_axis_label(value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 0.05 || rounded < 0.0 {
        return String::new();
    }
    let index = rounded as i64;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as usize;
    format!("{} {}", MONTH_NAMES[month], year)
}

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn format_gbp(v: f64) -> String {
    let sign = if v < 0.0 { "-" } else { "" };
    format!("{sign}£{}", group_thousands(v.abs().round() as u64))
}

fn format_pct(v: f64) -> String {
    format!("{:.1}%", v * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn currency_and_percent_formats() {
        assert_eq!(format_gbp(1234.56), "£1,235");
        assert_eq!(format_gbp(-42.4), "-£42");
        assert_eq!(format_pct(0.1149), "11.5%");
    }

    #[test]
    fn axis_labels_only_appear_on_integer_marks() {
        let labels = vec!["England".to_string(), "Wales".to_string()];
        assert_eq!(index_label(&labels, 1.0), "Wales");
        assert_eq!(index_label(&labels, 0.4), "");
        assert_eq!(index_label(&labels, 5.0), "");
        assert_eq!(index_label(&labels, -1.0), "");
    }

    #[test]
    fn month_axis_labels_decode_the_index() {
        // 2003 × 12 + 3 → April 2003.
        assert_eq!(month_axis_label(2003.0 * 12.0 + 3.0), "Apr 2003");
        assert_eq!(month_axis_label(2003.0 * 12.0 + 3.4), "");
    }
}
