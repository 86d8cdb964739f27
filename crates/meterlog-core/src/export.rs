//! CSV and printable HTML exports.
//!
//! Callers choose which readings to export (e.g. via
//! [`filter_by_window`](crate::stats::filter_by_window) or an explicit date
//! range); this module only renders documents. Every CSV field is quoted,
//! with embedded quotes doubled.

use std::collections::HashMap;

use csv::{QuoteStyle, WriterBuilder};

use crate::error::ExportError;
use crate::stats::compute_intervals;
use crate::{CostSettings, Meter, MeterId, MeterReading};

/// One reading per row: date, counter value, unit, consumption against the
/// previous row (`0.00` for the first), notes.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn readings_csv(meter: &Meter, readings: &[MeterReading]) -> Result<String, ExportError> {
    let mut sorted: Vec<&MeterReading> = readings.iter().collect();
    sorted.sort_by_key(|r| r.date);

    let mut buf = Vec::new();
    {
        let mut wtr = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(&mut buf);

        wtr.write_record(["Date", "Meter value", "Unit", "Consumption", "Notes"])?;

        let mut previous: Option<&MeterReading> = None;
        for reading in sorted {
            let consumption = previous.map_or(0.0, |p| reading.value - p.value);
            wtr.write_record([
                reading.date.to_string(),
                reading.value.to_string(),
                meter.unit.clone(),
                format!("{consumption:.2}"),
                reading.notes.clone().unwrap_or_default(),
            ])?;
            previous = Some(reading);
        }
        wtr.flush()?;
    }

    Ok(String::from_utf8(buf)?)
}

/// One interval per row across all meters: meter name, type, date, counter
/// value, consumption, cost at the meter's own rate.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn intervals_csv(
    meters: &[Meter],
    readings_by_meter: &HashMap<MeterId, Vec<MeterReading>>,
    settings: &CostSettings,
) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    {
        let mut wtr = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(&mut buf);

        wtr.write_record(["Meter", "Type", "Date", "Meter value", "Consumption", "Cost"])?;

        for meter in meters {
            let Some(readings) = readings_by_meter.get(&meter.id) else {
                continue;
            };
            let rate = settings.rate_for(meter.meter_type);
            for interval in compute_intervals(readings, rate) {
                wtr.write_record([
                    meter.name.clone(),
                    meter.meter_type.as_str().to_string(),
                    interval.date.to_string(),
                    interval.meter_value.to_string(),
                    format!("{:.2}", interval.consumption),
                    format!("{:.2}", interval.cost),
                ])?;
            }
        }
        wtr.flush()?;
    }

    Ok(String::from_utf8(buf)?)
}

/// Render the printable reading history for one meter.
///
/// Produces a complete HTML document; handing it to a print dialog is the
/// presentation layer's job.
#[must_use]
pub fn html_report(meter: &Meter, readings: &[MeterReading]) -> String {
    let mut sorted: Vec<&MeterReading> = readings.iter().collect();
    sorted.sort_by_key(|r| r.date);

    let period = match (sorted.first(), sorted.last()) {
        (Some(first), Some(last)) => format!("{} – {}", first.date, last.date),
        _ => "–".to_string(),
    };

    let mut rows = String::new();
    let mut previous: Option<&MeterReading> = None;
    for reading in &sorted {
        let consumption = previous.map_or(0.0, |p| reading.value - p.value);
        let notes = reading.notes.as_deref().unwrap_or("-");
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{} {}</td><td>{:.2} {}</td><td>{}</td></tr>\n",
            reading.date,
            reading.value,
            escape(&meter.unit),
            consumption,
            escape(&meter.unit),
            escape(notes),
        ));
        previous = Some(reading);
    }

    let total = match (sorted.first(), sorted.last()) {
        (Some(first), Some(last)) => last.value - first.value,
        _ => 0.0,
    };
    let avg_per_interval = if sorted.len() > 1 {
        total / (sorted.len() - 1) as f64
    } else {
        0.0
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Meter readings - {name}</title>
<style>
body {{ font-family: Arial, sans-serif; margin: 20px; }}
h1 {{ color: #333; margin-bottom: 10px; }}
.info {{ margin-bottom: 20px; color: #666; }}
table {{ border-collapse: collapse; width: 100%; margin-top: 20px; }}
th, td {{ border: 1px solid #ddd; padding: 8px; text-align: left; }}
th {{ background-color: #f2f2f2; font-weight: bold; }}
tr:nth-child(even) {{ background-color: #f9f9f9; }}
.summary {{ margin-top: 20px; padding: 15px; background-color: #f5f5f5; border-radius: 5px; }}
</style>
</head>
<body>
<h1>Meter readings: {name}</h1>
<div class="info">
<p><strong>Type:</strong> {meter_type}</p>
<p><strong>Serial number:</strong> {serial}</p>
<p><strong>Period:</strong> {period}</p>
<p><strong>Readings:</strong> {count}</p>
</div>
<table>
<thead>
<tr><th>Date</th><th>Meter value</th><th>Consumption</th><th>Notes</th></tr>
</thead>
<tbody>
{rows}</tbody>
</table>
<div class="summary">
<h3>Summary</h3>
<p><strong>Total consumption:</strong> {total:.2} {unit}</p>
<p><strong>Average per reading:</strong> {avg:.2} {unit}</p>
</div>
</body>
</html>
"#,
        name = escape(&meter.name),
        meter_type = meter.meter_type.as_str(),
        serial = escape(&meter.serial_number),
        period = period,
        count = sorted.len(),
        rows = rows,
        total = total,
        avg = avg_per_interval,
        unit = escape(&meter.unit),
    )
}

/// Minimal HTML escaping for user-entered text.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MeterType;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn water_meter() -> Meter {
        Meter::new("Water".into(), MeterType::Water, "W-2001".into(), "m³".into())
    }

    fn readings(meter: &Meter, points: &[(&str, f64)]) -> Vec<MeterReading> {
        points
            .iter()
            .map(|(d, v)| MeterReading::new(meter.id, *v, date(d)))
            .collect()
    }

    #[test]
    fn readings_csv_quotes_every_field() {
        let meter = water_meter();
        let rs = readings(&meter, &[("2024-01-01", 100.0), ("2024-02-01", 110.0)]);

        let csv = readings_csv(&meter, &rs).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], r#""Date","Meter value","Unit","Consumption","Notes""#);
        assert_eq!(lines[1], r#""2024-01-01","100","m³","0.00","""#);
        assert_eq!(lines[2], r#""2024-02-01","110","m³","10.00","""#);
    }

    #[test]
    fn readings_csv_doubles_embedded_quotes() {
        let meter = water_meter();
        let rs = vec![MeterReading::new(meter.id, 100.0, date("2024-01-01"))
            .with_notes(r#"after "renovation""#)];

        let csv = readings_csv(&meter, &rs).unwrap();
        assert!(csv.contains(r#""after ""renovation""""#));
    }

    #[test]
    fn intervals_csv_covers_all_meters() {
        let electricity = Meter::new(
            "Main".into(),
            MeterType::Electricity,
            "E-1".into(),
            "kWh".into(),
        );
        let water = water_meter();

        let mut by_meter = HashMap::new();
        by_meter.insert(
            electricity.id,
            readings(&electricity, &[("2024-01-01", 100.0), ("2024-02-01", 200.0)]),
        );
        by_meter.insert(
            water.id,
            readings(&water, &[("2024-01-01", 50.0), ("2024-02-01", 60.0)]),
        );

        let settings = CostSettings {
            electricity: 0.30,
            gas: 0.12,
            water: 4.50,
        };

        let meters = vec![electricity, water];
        let csv = intervals_csv(&meters, &by_meter, &settings).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            r#""Meter","Type","Date","Meter value","Consumption","Cost""#
        );
        assert!(lines.contains(&r#""Main","electricity","2024-02-01","200","100.00","30.00""#));
        assert!(lines.contains(&r#""Water","water","2024-02-01","60","10.00","45.00""#));
    }

    #[test]
    fn html_report_contains_table_and_summary() {
        let meter = water_meter();
        let rs = readings(
            &meter,
            &[("2024-01-01", 100.0), ("2024-02-01", 110.0), ("2024-03-01", 125.0)],
        );

        let html = html_report(&meter, &rs);
        assert!(html.contains("<h1>Meter readings: Water</h1>"));
        assert!(html.contains("<strong>Serial number:</strong> W-2001"));
        assert!(html.contains("2024-01-01 – 2024-03-01"));
        assert!(html.contains("<strong>Total consumption:</strong> 25.00 m³"));
        assert!(html.contains("<strong>Average per reading:</strong> 12.50 m³"));
    }

    #[test]
    fn html_report_escapes_user_text() {
        let mut meter = water_meter();
        meter.name = "Garden <shed>".into();
        let rs = readings(&meter, &[("2024-01-01", 100.0)]);

        let html = html_report(&meter, &rs);
        assert!(html.contains("Garden &lt;shed&gt;"));
        assert!(!html.contains("<shed>"));
    }
}
