use serde_json::Value;

use invoice_fee_core::self_check;
use invoice_fee_core::FeePolicy;

/// Run the known-answer cases and report them. A failing case is an error so
/// the process exits non-zero.
pub fn run_self_check(policy: &FeePolicy) -> Result<Value, Box<dyn std::error::Error>> {
    let report = self_check::run_self_check(policy);
    if !report.passed {
        let failed: Vec<&str> = report.failures().map(|c| c.name.as_str()).collect();
        return Err(format!("self-check failed: {}", failed.join("; ")).into());
    }
    Ok(serde_json::json!({ "result": report }))
}
