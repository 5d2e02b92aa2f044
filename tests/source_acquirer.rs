use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use podforge::acquire::{InputSource, SourceAcquirer};
use podforge::providers::{
    ContentExtractor, DocumentIngestor, DocumentKind, ExtractMode, ProviderError, ScriptGenerator,
    SearchHit, SearchProvider,
};
use podforge::PipelineConfig;

struct FakeSearch {
    queries: Mutex<Vec<String>>,
    hits: Vec<SearchHit>,
}

impl FakeSearch {
    fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            queries: Mutex::new(Vec::new()),
            hits,
        }
    }
}

#[async_trait]
impl SearchProvider for FakeSearch {
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchHit>, ProviderError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.hits.iter().take(count).cloned().collect())
    }
}

/// Extracts a long body for "good" urls, fails for "bad" ones, and
/// returns a near-empty page for everything else unless rendered.
struct ModalExtractor {
    rendered_calls: AtomicUsize,
}

impl ModalExtractor {
    fn new() -> Self {
        Self {
            rendered_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ContentExtractor for ModalExtractor {
    async fn extract(&self, url: &str, mode: ExtractMode) -> Result<String, ProviderError> {
        if url.contains("bad") {
            return Err(ProviderError::ExtractionFailed(url.to_string()));
        }
        if url.contains("good") {
            return Ok("solid article body ".repeat(30));
        }
        match mode {
            ExtractMode::Static => Ok("  ".to_string()),
            ExtractMode::Rendered => {
                self.rendered_calls.fetch_add(1, Ordering::SeqCst);
                Ok("body only visible after rendering ".repeat(20))
            }
        }
    }
}

#[async_trait]
impl DocumentIngestor for ModalExtractor {
    async fn ingest(&self, bytes: &[u8], _kind: DocumentKind) -> Result<String, ProviderError> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

struct RefiningGenerator;

#[async_trait]
impl ScriptGenerator for RefiningGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String, ProviderError> {
        Ok("refined follow-up query".to_string())
    }
}

fn hit(url: &str, snippet: &str) -> SearchHit {
    SearchHit {
        url: url.to_string(),
        title: url.to_string(),
        snippet: snippet.to_string(),
    }
}

fn config() -> PipelineConfig {
    PipelineConfig {
        search_count: 4,
        min_extract_chars: 100,
        min_snippet_chars: 40,
        min_corpus_chars: 100,
        max_extra_queries: 2,
        supplementary_results: 2,
        ..PipelineConfig::default()
    }
}

fn acquirer(search: Arc<FakeSearch>, config: PipelineConfig) -> (SourceAcquirer, Arc<ModalExtractor>) {
    let extractor = Arc::new(ModalExtractor::new());
    (
        SourceAcquirer::new(
            search,
            extractor.clone(),
            extractor.clone(),
            Arc::new(RefiningGenerator),
            config,
        ),
        extractor,
    )
}

#[tokio::test]
async fn failed_extractions_fall_back_to_snippets_or_are_skipped() {
    let search = Arc::new(FakeSearch::new(vec![
        hit("https://good.example/one", "short"),
        hit(
            "https://bad.example/two",
            "a substantial snippet that easily clears the minimum length bar",
        ),
        hit("https://bad.example/three", "tiny"),
    ]));
    let (acquirer, _) = acquirer(search, PipelineConfig {
        max_extra_queries: 0,
        ..config()
    });

    let documents = acquirer
        .acquire(&InputSource::Topic("fjords".to_string()))
        .await
        .unwrap();

    // Good url extracted, bad-with-snippet kept as snippet, tiny dropped.
    assert_eq!(documents.len(), 2);
    assert!(documents[0].text.contains("solid article body"));
    assert!(documents[1].text.contains("substantial snippet"));
}

#[tokio::test]
async fn thin_corpus_triggers_bounded_supplementary_search() {
    let search = Arc::new(FakeSearch::new(vec![hit(
        "https://bad.example/only",
        "one snippet just about long enough to survive the filter",
    )]));
    let (acquirer, _) = acquirer(search.clone(), config());

    let documents = acquirer
        .acquire(&InputSource::Topic("fjords".to_string()))
        .await
        .unwrap();

    let queries = search.queries.lock().unwrap();
    assert_eq!(queries[0], "fjords");
    assert!(queries[1..].iter().all(|q| q == "refined follow-up query"));
    // Primary query plus at most max_extra_queries supplementary passes.
    assert!(queries.len() <= 3);
    assert!(documents.iter().any(|d| !d.primary));
}

#[tokio::test]
async fn url_input_falls_back_to_rendered_extraction() {
    let search = Arc::new(FakeSearch::new(Vec::new()));
    let (acquirer, extractor) = acquirer(search, PipelineConfig {
        max_extra_queries: 0,
        ..config()
    });

    let documents = acquirer
        .acquire(&InputSource::Url("https://dynamic.example/app".to_string()))
        .await
        .unwrap();

    assert_eq!(extractor.rendered_calls.load(Ordering::SeqCst), 1);
    assert_eq!(documents.len(), 1);
    assert!(documents[0].text.contains("after rendering"));
}

#[tokio::test]
async fn oversized_text_is_chunked_within_the_context_budget() {
    let search = Arc::new(FakeSearch::new(Vec::new()));
    let (acquirer, _) = acquirer(search, PipelineConfig {
        max_extra_queries: 0,
        min_doc_chars: 100,
        context_budget_chars: 300,
        ..config()
    });

    let paragraphs: Vec<String> = (0..12).map(|i| format!("paragraph {i} {}", "x".repeat(70))).collect();
    let documents = acquirer
        .acquire(&InputSource::Text(paragraphs.join("\n\n")))
        .await
        .unwrap();

    // Budget of 300 chars at 100 per chunk keeps three chunks.
    assert_eq!(documents.len(), 3);
    assert!(documents
        .last()
        .unwrap()
        .text
        .contains("content truncated"));
}
