use std::fmt;

use super::types::{Analysis, AnalysisError};

const REPORT_WIDTH: usize = 70;
const STEP_TABLE_WIDTH: usize = 74;

/// Render an analysis as the human-readable report, or just the error line
pub fn format_report(analysis: &Result<Analysis, AnalysisError>) -> String {
    match analysis {
        Ok(analysis) => analysis.to_string(),
        Err(e) => format!("❌ Error: {}\n", e),
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(REPORT_WIDTH);

        writeln!(f, "\n{}", rule)?;
        writeln!(f, "📈 Performance Analysis Report")?;
        writeln!(f, "{}", rule)?;

        let summary = &self.summary;
        writeln!(f, "\n📊 Summary:")?;
        writeln!(f, "   Total Sessions: {}", summary.total_sessions)?;
        writeln!(
            f,
            "   Successful: {} ({:.1}%)",
            summary.successful_sessions, summary.success_rate
        )?;
        writeln!(f, "   Failed: {}", summary.failed_sessions)?;

        let overall = &self.overall_performance;
        writeln!(f, "\n⏱️  Overall Performance:")?;
        writeln!(f, "   Average Total Time: {:.0}ms", overall.avg_total_time_ms)?;
        writeln!(f, "   Min Total Time: {:.0}ms", overall.min_total_time_ms)?;
        writeln!(f, "   Max Total Time: {:.0}ms", overall.max_total_time_ms)?;
        writeln!(f, "   Average File Size: {:.2} MB", overall.avg_size_mb)?;

        writeln!(f, "\n🔍 Step Performance (Average):")?;
        writeln!(
            f,
            "   {:<30} {:<12} {:<12} {:<12} {:<8}",
            "Step", "Avg", "Min", "Max", "Count"
        )?;
        writeln!(f, "   {}", "-".repeat(STEP_TABLE_WIDTH))?;

        let mut steps: Vec<_> = self.step_performance.iter().collect();
        steps.sort_by(|a, b| b.1.avg_ms.total_cmp(&a.1.avg_ms));

        for (name, stats) in steps {
            writeln!(
                f,
                "   {:<30} {:>8.0}ms   {:>8.0}ms   {:>8.0}ms   {:>5}",
                name, stats.avg_ms, stats.min_ms, stats.max_ms, stats.count
            )?;
        }

        writeln!(f, "{}", rule)
    }
}
