use pilecheck::{Assessment, CheckConfig, Status};
use std::fmt::Write;

/// Format a load to whole units with thousands separators, e.g. `12,345`.
fn whole_units(value: f64) -> String {
    let rounded = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (idx, digit) in rounded.chars().enumerate() {
        if idx > 0 && (rounded.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if value < 0.0 && rounded != "0" {
        grouped.insert(0, '-');
    }
    grouped
}

/// Render the pile table, status totals and diagnostics as text.
///
/// Piles are listed worst first, the way they are reviewed.
#[must_use]
pub fn render_assessment(assessment: &Assessment, config: &CheckConfig) -> String {
    let mut output = String::new();

    writeln!(
        &mut output,
        "Pile load check: cases [{}], warning at ratio >= {:.2}, overload at ratio >= {:.2}",
        config.selected_cases.join(", "),
        config.yellow_threshold,
        config.red_threshold
    )
    .expect("writing to string cannot fail");
    writeln!(
        &mut output,
        "{:>8}  {:<10}  {:<12}  {:>10}  {:>10}  {:<16}  {:>10}  {:>6}  {}",
        "Element", "Label", "Section", "X", "Y", "Case", "Load", "Ratio", "Status"
    )
    .expect("writing to string cannot fail");

    for record in assessment.by_ratio_descending() {
        // Tension loads carry a `T` so uplift stands out in the listing.
        let direction = if record.is_tension { "T" } else { " " };
        let capacity_note = if record.capacity_substituted { " *" } else { "" };
        writeln!(
            &mut output,
            "{:>8}  {:<10}  {:<12}  {:>10.3}  {:>10.3}  {:<16}  {:>9}{}  {:>6.2}  {}{}",
            record.element_id,
            record.display_label.as_deref().unwrap_or("-"),
            record.section_label,
            record.x,
            record.y,
            record.governing_case,
            whole_units(record.load),
            direction,
            record.ratio,
            record.status,
            capacity_note
        )
        .expect("writing to string cannot fail");
    }

    output.push('\n');
    let counts = assessment.status_counts();
    for status in Status::ALL {
        writeln!(&mut output, "{:<18} {}", status.label(), counts[&status])
            .expect("writing to string cannot fail");
    }
    if assessment.records.iter().any(|r| r.capacity_substituted) {
        output.push_str("* capacity missing for this section and direction; 1.0 used\n");
    }

    output.push('\n');
    write!(&mut output, "{}", assessment.diagnostics).expect("writing to string cannot fail");
    output
}

/// Render the section labels and output cases found in the model.
#[must_use]
pub fn render_listing(sections: &[&str], cases: &[&str]) -> String {
    let mut output = String::new();
    output.push_str("Sections:\n");
    for section in sections {
        writeln!(&mut output, "  {section}").expect("writing to string cannot fail");
    }
    output.push_str("Output cases:\n");
    for case in cases {
        writeln!(&mut output, "  {case}").expect("writing to string cannot fail");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use pilecheck::{Diagnostics, ElementId, PileRecord, StationMatch};

    fn record(id: i64, ratio: f64, status: Status) -> PileRecord {
        PileRecord {
            element_id: ElementId(id),
            section_label: "P60".into(),
            display_label: Some(format!("C{id}")),
            x: 1.5,
            y: 2.0,
            governing_case: "ULS1".into(),
            axial_force: -ratio * 500.0,
            is_tension: false,
            load: ratio * 500.0,
            capacity: 500.0,
            capacity_substituted: false,
            station_match: StationMatch::Exact,
            ratio,
            status,
        }
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(whole_units(0.4), "0");
        assert_eq!(whole_units(999.6), "1,000");
        assert_eq!(whole_units(1_234_567.0), "1,234,567");
        assert_eq!(whole_units(-12_345.0), "-12,345");
    }

    #[test]
    fn lists_worst_pile_first() {
        let assessment = Assessment {
            records: vec![
                record(1, 0.5, Status::Safe),
                record(2, 1.25, Status::OverLoad),
            ],
            diagnostics: Diagnostics::default(),
        };
        let config = pilecheck::CheckConfig::for_cases(["ULS1"]);
        let report = render_assessment(&assessment, &config);

        let first = report.find("C2").expect("pile 2 listed");
        let second = report.find("C1").expect("pile 1 listed");
        assert!(first < second);
        assert!(report.contains("625"));
        assert!(report.contains("1.25"));
        assert!(report.contains("Over Load (Red)    1"));
        assert!(report.contains("No data-quality issues."));
    }

    #[test]
    fn listing_names_sections_and_cases() {
        let listing = render_listing(&["P60", "P80"], &["DL", "ULS1"]);
        assert!(listing.contains("  P80\n"));
        assert!(listing.contains("Output cases:\n  DL\n  ULS1\n"));
    }
}
