//! Batch analysis of posts with ordered, bounded concurrency

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{BuffettError, Result};
use crate::inference::PostAnalyzer;
use crate::post::Post;
use crate::recommendation::QuantReport;

/// One post of an analysis request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub account_id: String,
    pub handle: String,
    pub content: String,
}

impl Instance {
    pub fn post(&self) -> Post {
        Post::new(&self.handle, &self.content)
    }
}

/// How far the analysis of a post got
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// Final text present and it holds a valid report
    Analyzed,
    /// Final text present but no valid report in it
    NoRecommendation,
    /// The pipeline produced no final text
    NoOutput,
}

/// Result of analyzing one post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub account_id: String,
    pub analysis: Option<String>,
    pub status: AnalysisStatus,
    pub recommendation: Option<QuantReport>,
}

impl AnalysisOutput {
    /// Classify the pipeline's final text
    pub fn from_analysis(account_id: impl Into<String>, analysis: Option<String>) -> Self {
        let account_id = account_id.into();
        let (status, recommendation) = match analysis.as_deref() {
            None => (AnalysisStatus::NoOutput, None),
            Some(text) => match QuantReport::parse(text) {
                Ok(report) => (AnalysisStatus::Analyzed, Some(report)),
                Err(e) => {
                    info!("No recommendation for {}: {}", account_id, e);
                    (AnalysisStatus::NoRecommendation, None)
                }
            },
        };

        Self {
            account_id,
            analysis,
            status,
            recommendation,
        }
    }
}

/// Analyze every instance, at most `max_concurrent` at a time
///
/// Outputs are in input order. The first failure aborts the batch.
pub async fn analyze_instances(
    analyzer: &dyn PostAnalyzer,
    instances: Vec<Instance>,
    max_concurrent: usize,
) -> Result<Vec<AnalysisOutput>> {
    let total = instances.len();
    debug!("Analyzing {} posts, {} at a time", total, max_concurrent);

    stream::iter(instances)
        .map(|instance| async move {
            let analysis = analyzer.analyze(instance.post()).await?;
            Ok::<_, BuffettError>(AnalysisOutput::from_analysis(instance.account_id, analysis))
        })
        .buffered(max_concurrent.max(1))
        .try_collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::MockPostAnalyzer;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const VALID_REPORT: &str = r#"```json
{"sentiment": "Positive", "recommendation": {"AAPL": {"sentiment": "Positive",
 "rec": {"strongBuy": 10, "buy": 50, "hold": 30, "sell": 10, "strongSell": 0}}}}
```"#;

    fn instance(id: &str) -> Instance {
        Instance {
            account_id: id.to_string(),
            handle: format!("handle-{id}"),
            content: "content".to_string(),
        }
    }

    #[test]
    fn test_status_classification() {
        let out = AnalysisOutput::from_analysis("a", Some(VALID_REPORT.to_string()));
        assert_eq!(out.status, AnalysisStatus::Analyzed);
        assert!(out.recommendation.is_some());

        let out = AnalysisOutput::from_analysis("b", Some("plain prose".to_string()));
        assert_eq!(out.status, AnalysisStatus::NoRecommendation);
        assert_eq!(out.analysis.as_deref(), Some("plain prose"));
        assert!(out.recommendation.is_none());

        let out = AnalysisOutput::from_analysis("c", None);
        assert_eq!(out.status, AnalysisStatus::NoOutput);
        assert!(out.analysis.is_none());
    }

    #[test]
    fn test_output_serialization() {
        let out = AnalysisOutput::from_analysis("acc-1", None);
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "account_id": "acc-1",
                "analysis": null,
                "status": "no_output",
                "recommendation": null
            })
        );
    }

    #[tokio::test]
    async fn test_outputs_keep_input_order() {
        let mut analyzer = MockPostAnalyzer::new();
        analyzer.expect_analyze().times(3).returning(|post| {
            Ok(match post.handle.as_str() {
                "handle-2" => None,
                other => Some(format!("analysis of {other}")),
            })
        });

        let outputs = analyze_instances(
            &analyzer,
            vec![instance("1"), instance("2"), instance("3")],
            4,
        )
        .await
        .unwrap();

        let ids: Vec<_> = outputs.iter().map(|o| o.account_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(outputs[0].analysis.as_deref(), Some("analysis of handle-1"));
        assert_eq!(outputs[1].status, AnalysisStatus::NoOutput);
    }

    #[tokio::test]
    async fn test_failure_aborts_batch() {
        let mut analyzer = MockPostAnalyzer::new();
        analyzer.expect_analyze().returning(|post| {
            if post.handle == "handle-2" {
                Err(BuffettError::Agent(agent_core::Error::ProcessingFailed(
                    "upstream".to_string(),
                )))
            } else {
                Ok(Some("fine".to_string()))
            }
        });

        let result = analyze_instances(&analyzer, vec![instance("1"), instance("2")], 1).await;
        assert!(matches!(result, Err(BuffettError::Agent(_))));
    }

    /// Sleeps so overlapping calls can be observed
    struct Tracking {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl PostAnalyzer for Tracking {
        async fn analyze(&self, post: Post) -> Result<Option<String>> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            // Later posts finish first
            let delay = if post.handle.ends_with('1') { 40 } else { 5 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(Some(post.handle))
        }
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let analyzer = Arc::new(Tracking {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let instances = (1..=6).map(|i| instance(&i.to_string())).collect();

        let outputs = analyze_instances(analyzer.as_ref(), instances, 2).await.unwrap();

        assert_eq!(analyzer.peak.load(Ordering::SeqCst), 2);
        let handles: Vec<_> = outputs.iter().filter_map(|o| o.analysis.as_deref()).collect();
        assert_eq!(
            handles,
            vec!["handle-1", "handle-2", "handle-3", "handle-4", "handle-5", "handle-6"]
        );
    }

    #[tokio::test]
    async fn test_single_slot_is_sequential() {
        let analyzer = Tracking {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        };
        let instances = (1..=3).map(|i| instance(&i.to_string())).collect();

        analyze_instances(&analyzer, instances, 1).await.unwrap();
        assert_eq!(analyzer.peak.load(Ordering::SeqCst), 1);
    }
}
