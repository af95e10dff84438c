//! Run summary

/// Aggregated counters for one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Data rows read from the input (header excluded)
    pub rows_read: u64,
    /// Observations staged for commit
    pub observations_staged: u64,
    /// Distinct products resolved during the run
    pub distinct_products: u64,
    /// Distinct resellers resolved during the run
    pub distinct_resellers: u64,
    /// Rows skipped because of a per-field rejection
    pub errors: u64,
    /// Batch commits issued
    pub commits: u64,
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(f, "Import finished")?;
        writeln!(f, "  Rows read:           {}", self.rows_read)?;
        writeln!(f, "  Observations loaded: {}", self.observations_staged)?;
        writeln!(f, "  Distinct products:   {}", self.distinct_products)?;
        writeln!(f, "  Distinct resellers:  {}", self.distinct_resellers)?;
        writeln!(f, "  Batch commits:       {}", self.commits)?;
        if self.errors > 0 {
            writeln!(f, "  Rows skipped:        {}", self.errors)?;
        }
        write!(f, "{}", "=".repeat(50))
    }
}
