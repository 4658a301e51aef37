//! Terminal rendering of search outcomes
//!
//! Every source gets its own section. A failed source prints an error notice
//! in its own section only; a source with nothing to show prints a neutral
//! "No data found" notice.

use genescope_core::{SearchOutcome, SourceName, SourcePayload, SourceResult};
use genescope_egress::dataset_expression::find_dataset;
use genescope_egress::tissue_atlas::{is_rna_response_key, tissue_display_name};
use serde_json::Value;
use std::io::{self, Write};
use tracing::debug;

/// Number of tissues listed per gene
const TOP_TISSUES: usize = 10;

pub fn render_search<W: Write>(
    out: &mut W,
    query: &str,
    outcome: &SearchOutcome,
) -> io::Result<()> {
    writeln!(
        out,
        "Search results for `{}` ({} sources, {:.2} sec)",
        query,
        outcome.len(),
        outcome.elapsed_secs()
    )?;
    render_sections(out, query, outcome)
}

pub fn render_dataset<W: Write>(
    out: &mut W,
    dataset_id: &str,
    gene_id: &str,
    outcome: &SearchOutcome,
) -> io::Result<()> {
    let dataset_name = find_dataset(dataset_id)
        .map(|d| d.name)
        .unwrap_or("unlisted dataset");
    writeln!(
        out,
        "Dataset {} ({}) for gene {} ({:.2} sec)",
        dataset_id,
        dataset_name,
        gene_id,
        outcome.elapsed_secs()
    )?;
    render_sections(out, gene_id, outcome)
}

fn render_sections<W: Write>(out: &mut W, query: &str, outcome: &SearchOutcome) -> io::Result<()> {
    for (name, result) in outcome.results() {
        writeln!(out)?;
        writeln!(out, "### {}", name)?;
        render_section(out, *name, query, result)?;
    }
    Ok(())
}

fn render_section<W: Write>(
    out: &mut W,
    name: SourceName,
    query: &str,
    result: &SourceResult,
) -> io::Result<()> {
    let payload = match result {
        SourceResult::Failure { error } => {
            return writeln!(out, "[error] Error on search: `{}`: {}", query, error);
        }
        SourceResult::Success { payload } => payload,
    };

    if payload.is_empty() {
        writeln!(out, "[warn] No data found by query: `{}`", query)?;
        if name == SourceName::ImmuneCellExpression {
            writeln!(
                out,
                "       DICE only matches upper-case gene symbols such as IL2RA, \
                 not synonyms or Ensembl IDs."
            )?;
        }
        return Ok(());
    }

    match (name, payload) {
        (SourceName::TissueAtlas, SourcePayload::Records(records)) => {
            render_tissue_atlas(out, query, records)
        }
        (SourceName::GeneAnnotation, SourcePayload::Records(hits)) => {
            render_gene_annotation(out, query, hits)
        }
        (SourceName::ImmuneCellExpression, SourcePayload::Csv(body)) => {
            render_immune_cell(out, body)
        }
        (_, SourcePayload::Csv(body)) => render_csv(out, body),
        (_, SourcePayload::Records(records)) => {
            for record in records {
                writeln!(out, "{}", record)?;
            }
            Ok(())
        }
        (_, SourcePayload::Empty) => Ok(()),
    }
}

fn render_tissue_atlas<W: Write>(out: &mut W, query: &str, records: &[Value]) -> io::Result<()> {
    writeln!(out, "{} genes found by query: `{}`", records.len(), query)?;

    for record in records {
        writeln!(out)?;
        writeln!(
            out,
            "{} (synonyms: {})",
            field_text(record, "Gene"),
            field_text(record, "Gene synonym")
        )?;
        writeln!(out, "  Ensembl:     {}", field_text(record, "Ensembl"))?;
        writeln!(out, "  Description: {}", field_text(record, "Gene description"))?;

        let tissues = top_tissues(record, TOP_TISSUES);
        if tissues.is_empty() {
            writeln!(out, "  No tissue RNA expression reported")?;
            continue;
        }
        writeln!(out, "  Top tissues by RNA expression [nTPM]:")?;
        for (tissue, ntpm) in tissues {
            writeln!(out, "    {:<32} {:>10.1}", tissue, ntpm)?;
        }
    }
    Ok(())
}

fn render_gene_annotation<W: Write>(out: &mut W, query: &str, hits: &[Value]) -> io::Result<()> {
    writeln!(out, "{} genes found by query: `{}`", hits.len(), query)?;
    writeln!(
        out,
        "{:<18} {:<12} {:<18} {:<40} {}",
        "Gene ID", "Symbol", "Ensembl", "Name", "Aliases"
    )?;

    for hit in hits {
        writeln!(
            out,
            "{:<18} {:<12} {:<18} {:<40} {}",
            field_text(hit, "_id"),
            field_text(hit, "symbol"),
            ensembl_gene(hit),
            field_text(hit, "name"),
            field_text(hit, "alias")
        )?;
    }
    Ok(())
}

fn render_immune_cell<W: Write>(out: &mut W, body: &[u8]) -> io::Result<()> {
    let stats = expression_stats(body);
    if stats.is_empty() {
        return writeln!(out, "[warn] No expression values in DICE response");
    }

    writeln!(
        out,
        "{:<36} {:>10} {:>10} {:>10} {:>10}",
        "Cell type", "Median", "Mean", "Min", "Max"
    )?;
    for s in stats {
        writeln!(
            out,
            "{:<36} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            s.cell_type, s.median, s.mean, s.min, s.max
        )?;
    }
    Ok(())
}

fn render_csv<W: Write>(out: &mut W, body: &[u8]) -> io::Result<()> {
    for row in csv_rows(body) {
        writeln!(out, "{}", row.join(" | "))?;
    }
    Ok(())
}

/// Summary of one cell type's expression values [TPM]
#[derive(Debug, Clone, PartialEq)]
pub struct CellTypeStats {
    pub cell_type: String,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

/// Per-cell-type statistics of a DICE CSV, highest median first
///
/// The first line is a header. Each following row is a cell type followed by
/// one value per donor; rows may differ in length. Rows without any numeric
/// value are skipped.
pub fn expression_stats(body: &[u8]) -> Vec<CellTypeStats> {
    let mut stats: Vec<CellTypeStats> = csv_rows(body)
        .into_iter()
        .skip(1)
        .filter_map(|row| {
            let mut fields = row.into_iter();
            let cell_type = fields.next()?;
            let mut values: Vec<f64> = fields.filter_map(|f| f.trim().parse().ok()).collect();
            if values.is_empty() {
                debug!("Skipping DICE row without values: {}", cell_type);
                return None;
            }
            values.sort_by(f64::total_cmp);

            Some(CellTypeStats {
                cell_type,
                mean: values.iter().sum::<f64>() / values.len() as f64,
                median: median(&values),
                min: values[0],
                max: values[values.len() - 1],
            })
        })
        .collect();

    stats.sort_by(|a, b| b.median.total_cmp(&a.median));
    stats
}

// Expects sorted, non-empty input
fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Rows of a CSV blob, header included
///
/// Rows may differ in length and quoted fields may span lines. Rows that
/// fail to parse are skipped.
pub fn csv_rows(body: &[u8]) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body)
        .into_records()
        .filter_map(|record| match record {
            Ok(record) => Some(record.iter().map(str::to_string).collect()),
            Err(e) => {
                debug!("Skipping malformed CSV row: {}", e);
                None
            }
        })
        .collect()
}

/// Tissues with the highest RNA expression in an HPA record
pub fn top_tissues(record: &Value, limit: usize) -> Vec<(String, f64)> {
    let Some(fields) = record.as_object() else {
        return Vec::new();
    };

    let mut tissues: Vec<(String, f64)> = fields
        .iter()
        .filter(|(key, _)| is_rna_response_key(key))
        .filter_map(|(key, value)| Some((tissue_display_name(key), as_number(value)?)))
        .collect();

    tissues.sort_by(|a, b| b.1.total_cmp(&a.1));
    tissues.truncate(limit);
    tissues
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

fn field_text(record: &Value, key: &str) -> String {
    record.get(key).map(value_text).unwrap_or_else(|| "-".to_string())
}

// MyGene.info returns one object or a list of objects under `ensembl`
fn ensembl_gene(hit: &Value) -> String {
    match hit.get("ensembl") {
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|e| field_text(e, "gene"))
            .collect::<Vec<_>>()
            .join(", "),
        Some(entry) => field_text(entry, "gene"),
        None => "-".to_string(),
    }
}
