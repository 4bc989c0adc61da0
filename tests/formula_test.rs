//! Integration tests for verification formula reconstruction.

use atskaite::formula::{reconstruct_formulas, FormulaEngine};
use atskaite::layout::{layout_section, LayoutPreset, StyleOptions, RECALCULATED_LABEL};
use atskaite::model::{Line, Paragraph, Section, Sheet, SourceDocument, Table};
use atskaite::ReportConverter;

fn cash_flow_report() -> SourceDocument {
    let mut source = SourceDocument::new();
    source.add_paragraph(Paragraph::new("Vadības ziņojums", 0));
    source.add_paragraph(Paragraph::new("Naudas plūsmas pārskats", 20));
    source.add_table(
        Table::new(50)
            .with_row(["", "2023", "2022"])
            .with_row(["Saņemts no pircējiem", "10", "9"])
            .with_row(["Maksāts piegādātājiem", "(20)", "(19)"])
            .with_row(["Procentu maksājumi", "30", "1 200"])
            .with_row(["Kopā pamatdarbība", "20", "(10)"]),
    );
    source.add_table(
        Table::new(200)
            .with_row(["", "2023", "2022"])
            .with_row(["Kopā naudas plūsma", "20", "(10)"]),
    );
    source
}

#[test]
fn test_three_row_block() {
    let result = ReportConverter::default()
        .convert_document(cash_flow_report())
        .unwrap();
    let cf = result.workbook.sheet("CF").unwrap();

    assert_eq!(cf.text(7, 2), Some(RECALCULATED_LABEL));
    assert_eq!(cf.get(7, 3).unwrap().value.as_formula(), Some("=SUM(C3:C5)"));
    assert_eq!(cf.get(7, 4).unwrap().value.as_formula(), Some("=SUM(D3:D5)"));
    assert_eq!(cf.get(8, 3).unwrap().value.as_formula(), Some("=C6-C7"));
    assert_eq!(cf.get(8, 4).unwrap().value.as_formula(), Some("=D6-D7"));

    assert_eq!(cf.get(4, 3).unwrap().value.as_number(), Some(-20.0));
    assert_eq!(cf.get(5, 4).unwrap().value.as_number(), Some(1200.0));
}

#[test]
fn test_empty_block_skipped() {
    let result = ReportConverter::default()
        .convert_document(cash_flow_report())
        .unwrap();
    let cf = result.workbook.sheet("CF").unwrap();

    // second table: header row 10, total row 11, scaffold from row 12
    assert_eq!(cf.text(12, 2), Some(RECALCULATED_LABEL));
    assert!(cf.get(12, 3).is_none());
    assert!(cf.get(13, 4).is_none());

    let skipped = &result.stats.skipped_formulas;
    assert_eq!(skipped.len(), 2);
    assert!(skipped.iter().all(|s| s.sheet == "CF" && s.row == 12));
    let columns: Vec<&str> = skipped.iter().map(|s| s.column.as_str()).collect();
    assert_eq!(columns, vec!["C", "D"]);
    assert_eq!(result.stats.formulas_written, 4);
}

#[test]
fn test_zero_placeholders_inside_block() {
    let mut source = SourceDocument::new();
    source.add_paragraph(Paragraph::new("Vadības ziņojums", 0));
    source.add_paragraph(Paragraph::new("Bilance", 20));
    source.add_table(
        Table::new(30)
            .with_row(["", "2023", "2022"])
            .with_row(["Nauda", "60", "50"])
            .with_row(["Krājumi", "–", "40"])
            .with_row(["Debitori", "40", "-"])
            .with_row(["Kopā aktīvi", "100", "90"]),
    );

    let result = ReportConverter::default().convert_document(source).unwrap();
    let face = result.workbook.sheet("FACE").unwrap();

    assert_eq!(face.get(7, 3).unwrap().value.as_formula(), Some("=SUM(C3:C5)"));
    assert_eq!(face.get(7, 4).unwrap().value.as_formula(), Some("=SUM(D3:D5)"));
    assert_eq!(face.get(4, 3).unwrap().value.as_number(), Some(0.0));
    assert!(result.stats.skipped_formulas.is_empty());
}

#[test]
fn test_layout_then_formulas_without_spacer() {
    let style = StyleOptions::default();
    let preset = LayoutPreset::for_section(Section::Equity);
    let mut sheet = Sheet::new("EMT");
    let lines = vec![
        Line::Text("Pašu kapitāla izmaiņu pārskats".into()),
        Line::Row(vec!["".into(), "2023".into(), "2022".into()]),
        Line::Row(vec!["Pamatkapitāls".into(), "5".into(), "5".into()]),
        Line::Row(vec!["Kopā".into(), "5".into(), "5".into()]),
    ];
    let summary = layout_section(&mut sheet, &lines, &preset, &style);
    assert_eq!(summary.total_rows, 1);

    // labels sit in column A here, so the engine finds no scaffold in column B
    let report = reconstruct_formulas(&mut sheet, &style);
    assert_eq!(report.label_rows, 0);

    sheet.insert_columns(1, 1);
    let report = FormulaEngine::new(&style).with_wrap(true).apply(&mut sheet);
    assert_eq!(report.label_rows, 1);
    assert_eq!(report.written(), 4);
    assert_eq!(sheet.get(5, 3).unwrap().value.as_formula(), Some("=SUM(C3:C3)"));
    assert!(sheet.get(5, 3).unwrap().style.wrap);
}
