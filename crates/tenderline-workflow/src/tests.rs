//! Integration tests for the workflow

#[cfg(test)]
mod tests {
    use crate::{
        Collaborators, DocumentSource, PdfRenderer, RequestDispatcher, RfpWorkflow,
        StaticDirectory, TextFileRenderer, VendorEntry, VendorSelection, WorkflowConfig,
        WorkflowError,
    };
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use tenderline_domain::traits::SendRegistry;
    use tenderline_domain::{
        CorrelationToken, MailError, RawMessage, SendRecord, StoreError, VendorAddress,
    };
    use tenderline_llm::MockProvider;
    use tenderline_mail::mock::{MockMailbox, RecordingTransport};
    use tenderline_store::MemoryRegistry;

    struct BrokenRegistry;

    impl SendRegistry for BrokenRegistry {
        fn append(&self, _record: SendRecord) -> Result<(), StoreError> {
            Err(StoreError::Io("disk full".to_string()))
        }

        fn lookup(&self, token: &CorrelationToken) -> Result<SendRecord, StoreError> {
            Err(StoreError::NotFound(token.to_string()))
        }

        fn list(&self) -> Result<Vec<SendRecord>, StoreError> {
            Ok(Vec::new())
        }
    }

    struct Harness {
        _dir: TempDir,
        transport: RecordingTransport,
        registry: Arc<MemoryRegistry>,
        workflow: RfpWorkflow,
    }

    fn harness(llm: MockProvider, mailbox: MockMailbox) -> Harness {
        harness_with(llm, mailbox, RecordingTransport::new(), None)
    }

    fn harness_with(
        llm: MockProvider,
        mailbox: MockMailbox,
        transport: RecordingTransport,
        registry: Option<Arc<dyn SendRegistry>>,
    ) -> Harness {
        let dir = TempDir::new().unwrap();
        let memory = Arc::new(MemoryRegistry::new());
        let directory = StaticDirectory::new(vec![
            VendorEntry {
                name: "Acme".to_string(),
                addresses: vec!["bids@acme.com".to_string(), "sales@acme.com".to_string()],
            },
            VendorEntry {
                name: "Beta".to_string(),
                addresses: vec!["quotes@beta.io".to_string()],
            },
        ]);

        let workflow = RfpWorkflow::new(
            Collaborators {
                llm: Arc::new(llm),
                directory: Arc::new(directory),
                renderer: Arc::new(TextFileRenderer::new(dir.path())),
                transport: Arc::new(transport.clone()),
                mailbox: Arc::new(mailbox),
                registry: registry.unwrap_or_else(|| memory.clone() as Arc<dyn SendRegistry>),
            },
            WorkflowConfig::default(),
        );

        Harness {
            _dir: dir,
            transport,
            registry: memory,
            workflow,
        }
    }

    fn reply(seq: u32, from: &str, subject: &str, body: &str) -> RawMessage {
        RawMessage::new(
            seq,
            format!("From: {}\r\nSubject: {}\r\n\r\n{}\r\n", from, subject, body),
        )
    }

    #[tokio::test]
    async fn test_dispatch_then_lookup() {
        let h = harness(MockProvider::unreachable(), MockMailbox::default());

        let sent = h
            .workflow
            .dispatch(
                "Need a website",
                &[VendorSelection::with_address("Acme", "acme@x.com")],
            )
            .await
            .unwrap();

        let record = h.workflow.lookup(&sent.token).await.unwrap();
        assert_eq!(
            record.vendor_address_pairs,
            vec![VendorAddress::new("Acme", "acme@x.com")]
        );
        assert_eq!(record.document_ref, sent.document_ref);
        assert!(sent.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_subject_carries_extractable_token() {
        let h = harness(MockProvider::unreachable(), MockMailbox::default());

        let sent = h
            .workflow
            .dispatch("Need a website", &[VendorSelection::named("Beta")])
            .await
            .unwrap();

        let outbox = h.transport.sent();
        let mail = &outbox[0];
        assert!(mail.subject.starts_with("Generated RFP - "));
        assert_eq!(
            CorrelationToken::extract_from_subject(&mail.subject),
            Some(sent.token.clone())
        );
        assert!(mail.body_text.contains("Need a website"));
        assert!(mail.body_text.contains(&sent.token.subject_tag()));
        assert_eq!(mail.recipients, vec!["quotes@beta.io"]);
    }

    #[tokio::test]
    async fn test_template_used_when_model_unreachable() {
        let h = harness(MockProvider::unreachable(), MockMailbox::default());

        let document = h
            .workflow
            .dispatcher()
            .generate_document("Build a clinic scheduling system")
            .await;

        assert_eq!(document.source, DocumentSource::Template);
        assert!(document.text.contains("Build a clinic scheduling system"));
    }

    #[tokio::test]
    async fn test_model_document_is_attached() {
        let h = harness(
            MockProvider::new("1. Introduction / Overview\nA website for Need a website."),
            MockMailbox::default(),
        );

        let sent = h
            .workflow
            .dispatch("Need a website", &[VendorSelection::named("Acme")])
            .await
            .unwrap();

        assert_eq!(sent.document_source, DocumentSource::Model);
        let written = std::fs::read_to_string(&sent.document_ref).unwrap();
        assert_eq!(written, sent.document_text);
        assert_eq!(
            h.transport.sent()[0].attachment.as_deref(),
            Some(std::path::Path::new(&sent.document_ref))
        );
    }

    #[tokio::test]
    async fn test_pairs_kept_while_recipients_deduplicated() {
        let h = harness(MockProvider::unreachable(), MockMailbox::default());

        let sent = h
            .workflow
            .dispatch(
                "Office furniture",
                &[
                    VendorSelection::named("Acme"),
                    VendorSelection::with_address("Gamma", "BIDS@acme.com"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(sent.recipients, vec!["bids@acme.com", "sales@acme.com"]);
        assert_eq!(sent.vendor_address_pairs.len(), 3);
        assert_eq!(
            sent.vendor_address_pairs[2],
            VendorAddress::new("Gamma", "BIDS@acme.com")
        );
    }

    #[tokio::test]
    async fn test_unknown_vendor_only_is_not_found() {
        let h = harness(MockProvider::unreachable(), MockMailbox::default());

        let result = h
            .workflow
            .dispatch("Need a website", &[VendorSelection::named("Nobody")])
            .await;

        assert!(matches!(result, Err(WorkflowError::NotFound(_))));
        assert!(h.transport.sent().is_empty());
        assert!(h.registry.is_empty());
    }

    #[tokio::test]
    async fn test_empty_description_rejected() {
        let h = harness(MockProvider::unreachable(), MockMailbox::default());
        let result = h
            .workflow
            .dispatch("   ", &[VendorSelection::named("Acme")])
            .await;
        assert_eq!(result.unwrap_err().code(), "invalid_request");
    }

    #[tokio::test]
    async fn test_transport_failure_records_nothing() {
        let h = harness_with(
            MockProvider::unreachable(),
            MockMailbox::default(),
            RecordingTransport::failing(MailError::Connection("refused".to_string())),
            None,
        );

        let result = h
            .workflow
            .dispatch("Need a website", &[VendorSelection::named("Acme")])
            .await;

        assert!(matches!(result, Err(WorkflowError::TransportFailure(_))));
        assert!(h.registry.is_empty());
    }

    #[tokio::test]
    async fn test_registry_failure_does_not_undo_send() {
        let h = harness_with(
            MockProvider::unreachable(),
            MockMailbox::default(),
            RecordingTransport::new(),
            Some(Arc::new(BrokenRegistry)),
        );

        let sent = h
            .workflow
            .dispatch("Need a website", &[VendorSelection::named("Acme")])
            .await
            .unwrap();

        assert_eq!(h.transport.sent().len(), 1);
        assert_eq!(sent.warnings.len(), 1);
        assert!(sent.warnings[0].contains("disk full"));
    }

    #[tokio::test]
    async fn test_tokens_unique_across_dispatches() {
        let h = harness(MockProvider::unreachable(), MockMailbox::default());

        let mut tokens = HashSet::new();
        for i in 0..20 {
            let sent = h
                .workflow
                .dispatch(&format!("Request {}", i), &[VendorSelection::named("Acme")])
                .await
                .unwrap();
            tokens.insert(sent.token);
        }

        assert_eq!(tokens.len(), 20);
        let listed = h.registry.list().unwrap();
        assert_eq!(listed.len(), 20);
    }

    #[tokio::test]
    async fn test_collect_attribute_decide() {
        let token = CorrelationToken::parse("tok-e2e").unwrap();
        let mailbox = MockMailbox::with_messages(vec![
            reply(1, "Acme <bids@acme.com>", "Re: RFP [sendId:tok-e2e]", "Quote one"),
            reply(2, "sales@acme.com", "Follow-up", "About tok-e2e: quote two"),
            reply(3, "quotes@beta.io", "Re: RFP [sendId:tok-e2e]", "Beta quote"),
            reply(4, "quotes@beta.io", "Unrelated", "Spring catalogue"),
            reply(5, "someone@else.org", "Re: RFP [sendId:tok-e2e]", "Forwarded"),
        ]);
        let h = harness(MockProvider::unreachable(), mailbox);

        h.registry
            .append(SendRecord::new(
                token.clone(),
                vec![
                    VendorAddress::new("Beta", "quotes@beta.io"),
                    VendorAddress::new("Acme", "bids@acme.com"),
                    VendorAddress::new("Acme", "sales@acme.com"),
                ],
                "RFP_1.txt",
            ))
            .unwrap();

        let report = h.workflow.replies(&token, None).await.unwrap();
        assert_eq!(report.replies.len(), 4);
        assert!(report.replies[3].matched_vendors.is_empty());

        let decision = h.workflow.decide(&token, None, None).await.unwrap();
        assert_eq!(decision.vendor_names, vec!["Beta", "Acme"]);
        assert_eq!(decision.reply_count, 4);
        assert_eq!(decision.decision.selected_vendor.as_deref(), Some("Acme"));
        assert!(decision.decision.is_fallback());
        assert!(decision.decision.rationale.contains("(2 replies)"));
    }

    #[tokio::test]
    async fn test_decide_unknown_token() {
        let h = harness(MockProvider::unreachable(), MockMailbox::default());
        let token = CorrelationToken::parse("missing").unwrap();

        let result = h.workflow.decide(&token, None, None).await;
        assert!(matches!(result, Err(WorkflowError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_vendor_names_from_directory() {
        let h = harness(MockProvider::unreachable(), MockMailbox::default());
        assert_eq!(h.workflow.vendor_names().await.unwrap(), vec!["Acme", "Beta"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_model_falls_back_to_template() {
        let llm = MockProvider::new("1. Introduction / Overview\nToo late.")
            .with_delay(Duration::from_secs(600));
        let h = harness(llm.clone(), MockMailbox::default());

        let started = tokio::time::Instant::now();
        let document = h
            .workflow
            .dispatcher()
            .generate_document("Replace the office printers")
            .await;

        assert!(started.elapsed() < Duration::from_secs(600));
        assert_eq!(llm.call_count(), 1);
        assert_eq!(document.source, DocumentSource::Template);
        assert!(document.text.contains("Replace the office printers"));
    }

    #[tokio::test]
    async fn test_malformed_explicit_address_rejected_before_send() {
        let h = harness(MockProvider::unreachable(), MockMailbox::default());

        let result = h
            .workflow
            .dispatch(
                "Need a website",
                &[VendorSelection::with_address("Acme", "not an address")],
            )
            .await;

        assert_eq!(result.unwrap_err().code(), "invalid_request");
        assert!(h.transport.sent().is_empty());
        assert!(h.registry.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_directory_address_skipped_with_warning() {
        let dir = TempDir::new().unwrap();
        let transport = RecordingTransport::new();
        let directory = StaticDirectory::new(vec![VendorEntry {
            name: "Acme".to_string(),
            addresses: vec!["broken address".to_string(), "bids@acme.com".to_string()],
        }]);
        let dispatcher = RequestDispatcher::new(
            Arc::new(MockProvider::unreachable()),
            Arc::new(directory),
            Arc::new(TextFileRenderer::new(dir.path())),
            Arc::new(transport.clone()),
            Arc::new(MemoryRegistry::new()),
            WorkflowConfig::default(),
        );

        let sent = dispatcher
            .dispatch("Need a website", &[VendorSelection::named("Acme")])
            .await
            .unwrap();

        assert_eq!(sent.recipients, vec!["bids@acme.com"]);
        assert_eq!(sent.warnings.len(), 1);
        assert!(sent.warnings[0].contains("broken address"));
    }

    #[tokio::test]
    async fn test_pdf_document_recorded_and_readable() {
        let dir = TempDir::new().unwrap();
        let registry = Arc::new(MemoryRegistry::new());
        let workflow = RfpWorkflow::new(
            Collaborators {
                llm: Arc::new(MockProvider::unreachable()),
                directory: Arc::new(StaticDirectory::default()),
                renderer: Arc::new(PdfRenderer::new(dir.path())),
                transport: Arc::new(RecordingTransport::new()),
                mailbox: Arc::new(MockMailbox::default()),
                registry: registry.clone(),
            },
            WorkflowConfig::default(),
        );

        let sent = workflow
            .dispatch(
                "Need a website",
                &[VendorSelection::with_address("Acme", "acme@x.com")],
            )
            .await
            .unwrap();
        assert!(sent.document_ref.ends_with(".pdf"));

        let document = workflow.document(&sent.token).await.unwrap();
        assert_eq!(document.content_type, "application/pdf");
        assert!(document.file_name.starts_with("RFP_"));
        assert!(document.bytes.starts_with(b"%PDF-"));

        std::fs::remove_file(&sent.document_ref).unwrap();
        let missing = workflow.document(&sent.token).await;
        assert!(matches!(missing, Err(WorkflowError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_document_for_unknown_token() {
        let h = harness(MockProvider::unreachable(), MockMailbox::default());
        let token = CorrelationToken::parse("missing").unwrap();

        let result = h.workflow.document(&token).await;
        assert!(matches!(result, Err(WorkflowError::NotFound(_))));
    }
}
