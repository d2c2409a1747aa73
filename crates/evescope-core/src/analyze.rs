use serde_json::Value;

use crate::aggregate::{Aggregator, DEFAULT_TOP_N};
use crate::detect;
use crate::models::AnalysisResult;
use crate::normalize::normalize;

/// Analyze a stream of raw EVE records: normalize and fold each one, then
/// evaluate the detection rules once and snapshot the result.
///
/// The input is consumed one record at a time; the engine holds only the
/// current record and its running tables, so arbitrarily long inputs stream
/// through without materialization.
pub fn analyze<I>(events: I) -> AnalysisResult
where
    I: IntoIterator<Item = Value>,
{
    analyze_with_top(events, DEFAULT_TOP_N)
}

/// [`analyze`] with an explicit cap for the top-N report lists.
pub fn analyze_with_top<I>(events: I, top: usize) -> AnalysisResult
where
    I: IntoIterator<Item = Value>,
{
    let mut agg = Aggregator::new();
    for record in events {
        agg.fold(&normalize(&record));
    }

    let detections = detect::evaluate(&agg);
    agg.finalize(detections, top)
}
