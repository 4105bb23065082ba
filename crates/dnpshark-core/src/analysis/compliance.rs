use std::collections::BTreeMap;

use crate::protocols::dnp3::annotation::{AnnotationKind, Severity};
use crate::{ComplianceSummary, Violation};

const MAX_EXAMPLES: usize = 3;

#[derive(Debug, Default)]
struct KindStats {
    severity: Option<Severity>,
    count: u64,
    examples: Vec<String>,
}

/// Annotation counts for every frame handed to the decoder.
#[derive(Debug, Default)]
pub(crate) struct ComplianceStats {
    frames: u64,
    clean_frames: u64,
    kinds: BTreeMap<AnnotationKind, KindStats>,
}

impl ComplianceStats {
    /// Record one frame and the kinds reported for it. An empty iterator
    /// counts the frame as clean.
    pub(crate) fn add_frame<I>(&mut self, findings: I, src: &str, dst: &str, ts: Option<&str>)
    where
        I: IntoIterator<Item = (AnnotationKind, Severity)>,
    {
        self.frames += 1;
        let mut clean = true;
        for (kind, severity) in findings {
            clean = false;
            let entry = self.kinds.entry(kind).or_default();
            entry.count += 1;
            // A kind observed as fatal at least once is reported as fatal.
            entry.severity = entry.severity.max(Some(severity));
            if entry.examples.len() < MAX_EXAMPLES {
                entry
                    .examples
                    .push(format!("{src} -> {dst} @ {}", ts.unwrap_or("unknown")));
            }
        }
        if clean {
            self.clean_frames += 1;
        }
    }

    pub(crate) fn frames(&self) -> u64 {
        self.frames
    }
}

pub(crate) fn build_compliance(stats: ComplianceStats) -> Vec<ComplianceSummary> {
    if stats.frames == 0 {
        return Vec::new();
    }
    let mut violations: Vec<(Severity, Violation)> = stats
        .kinds
        .into_iter()
        .map(|(kind, kind_stats)| {
            let severity = kind_stats.severity.unwrap_or(kind.default_severity());
            (
                severity,
                Violation {
                    id: kind.id().to_string(),
                    severity: severity.as_str().to_string(),
                    message: kind.summary().to_string(),
                    count: kind_stats.count,
                    examples: kind_stats.examples,
                },
            )
        })
        .collect();
    violations.sort_by(|(a_sev, a), (b_sev, b)| b_sev.cmp(a_sev).then_with(|| a.id.cmp(&b.id)));

    let percentage = stats.clean_frames as f64 * 100.0 / stats.frames as f64;
    vec![ComplianceSummary {
        protocol: "dnp3".to_string(),
        compliance_percentage: (percentage * 100.0).round() / 100.0,
        violations: violations.into_iter().map(|(_, violation)| violation).collect(),
    }]
}
