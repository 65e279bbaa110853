//! Dense descending rank
//!
//! Courses are ranked within their (term, college, subject) cohort by mean
//! rating, best first. Ties share a rank and the next distinct value is one
//! greater (1, 2, 2, 3). Non-comparable means sort to the top of the ranking
//! rather than being excluded; that "na-is-best" tie-break is a compatibility
//! requirement of the stored output.

/// Assign a dense descending rank to each mean.
///
/// Returned ranks are positionally aligned with the input. Non-finite means
/// share rank 1 and the best finite mean ranks immediately after them.
pub fn dense_rank_desc(means: &[f64]) -> Vec<u32> {
    let has_na = means.iter().any(|m| !m.is_finite());

    let mut distinct: Vec<f64> = means.iter().copied().filter(|m| m.is_finite()).collect();
    distinct.sort_by(|a, b| b.total_cmp(a));
    distinct.dedup();

    let offset = u32::from(has_na);
    means
        .iter()
        .map(|m| {
            if !m.is_finite() {
                1
            } else {
                let position = distinct
                    .iter()
                    .position(|d| d.total_cmp(m).is_eq())
                    .unwrap_or(0) as u32;
                position + 1 + offset
            }
        })
        .collect()
}
