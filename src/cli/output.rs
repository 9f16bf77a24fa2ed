//! Report rendering: colored human output and JSON

use anyhow::Result;
use colorful::Colorful;

use crate::core::{AnalysisReport, AnalyzerResult, Confidence, ConfidenceLabel, DetailValue};

/// Serialize the full report, including every probe, as pretty JSON.
pub fn print_json(report: &AnalysisReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Human-readable summary of one report.
pub fn print_report(report: &AnalysisReport, verbose: bool) {
    let composite = &report.composite;
    let pct = composite.score_autenticidad * 100.0;

    let verdict = if composite.es_autentico {
        format!("✓ AUTÉNTICA ({pct:.0}%)").green().to_string()
    } else {
        format!("✗ SOSPECHOSA ({pct:.0}%)").red().to_string()
    };
    println!("  Veredicto: {verdict}");
    println!("  Confianza: {}", label_text(&composite.nivel_confianza));

    for result in [
        &report.texture,
        &report.definition,
        &report.artifacts,
        &report.forensics,
    ] {
        print_analyzer(result, verbose);
    }

    if verbose && !composite.per_probe.is_empty() {
        println!("\n  Sondas forenses:");
        for probe in &composite.per_probe {
            let score = match probe.score {
                Some(s) => format!("{s:.3}"),
                None => "error".to_string(),
            };
            println!(
                "    • {:<12} {} (peso {:.2}, {})",
                probe.probe.name(),
                score,
                probe.probe.weight(),
                confidence_text(&probe.confidence)
            );
        }
    }

    println!("  Duración: {} ms", report.duration_ms);
}

fn print_analyzer(result: &AnalyzerResult, verbose: bool) {
    let score = match result.score {
        Some(s) => format!("{s:.2}/10"),
        None => "—".to_string(),
    };
    let line = format!(
        "  {:<12} {:>8}  [{}]",
        result.name,
        score,
        confidence_text(&result.confidence)
    );
    match result.confidence {
        Confidence::Error => println!("{}", line.red()),
        Confidence::Low => println!("{}", line.yellow()),
        _ => println!("{line}"),
    }

    if verbose {
        for (key, value) in &result.details {
            println!("      {key}: {}", detail_text(value));
        }
    }
}

fn detail_text(value: &DetailValue) -> String {
    match value {
        DetailValue::Text(s) => s.clone(),
        DetailValue::Number(n) => format!("{n:.4}"),
        DetailValue::Flag(b) => b.to_string(),
    }
}

fn confidence_text(confidence: &Confidence) -> &'static str {
    match confidence {
        Confidence::High => "alta",
        Confidence::Medium => "media",
        Confidence::Low => "baja",
        Confidence::Error => "error",
    }
}

fn label_text(label: &ConfidenceLabel) -> &'static str {
    match label {
        ConfidenceLabel::Alta => "alta",
        ConfidenceLabel::Media => "media",
        ConfidenceLabel::Baja => "baja",
    }
}
