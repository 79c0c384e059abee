use super::*;
use crate::index::similarity::cosine_similarity;
use std::path::PathBuf;

mod config_tests {
    use super::*;

    #[test]
    fn test_sentence_config_default() {
        let config = SentenceConfig::default();
        assert_eq!(config.embedding_dim, SENTENCE_EMBEDDING_DIM);
        assert_eq!(config.max_seq_len, SENTENCE_MAX_SEQ_LEN);
        assert!(!config.testing_stub);
        assert!(config.model_dir.as_os_str().is_empty());
    }

    #[test]
    fn test_sentence_config_paths() {
        let config = SentenceConfig::new("/models/minilm");
        assert_eq!(
            config.config_path(),
            PathBuf::from("/models/minilm/config.json")
        );
        assert_eq!(
            config.weights_path(),
            PathBuf::from("/models/minilm/model.safetensors")
        );
        assert_eq!(
            config.tokenizer_path(),
            PathBuf::from("/models/minilm/tokenizer.json")
        );
    }

    #[test]
    fn test_from_model_dir_none_is_stub() {
        assert!(SentenceConfig::from_model_dir(None).testing_stub);
        assert!(!SentenceConfig::from_model_dir(Some("/m".into())).testing_stub);
    }

    #[test]
    fn test_validation_empty_dir_no_stub() {
        let err = SentenceConfig::default().validate().unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidConfig { .. }));
    }

    #[test]
    fn test_validation_nonexistent_dir() {
        let err = SentenceConfig::new("/nonexistent/model")
            .validate()
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::ModelNotFound { .. }));
    }

    #[test]
    fn test_validation_zero_dim() {
        let err = SentenceConfig::stub_with_dim(0).validate().unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidConfig { .. }));
    }

    #[test]
    fn test_model_available_requires_all_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();
        std::fs::write(dir.path().join("tokenizer.json"), "{}").unwrap();

        let config = SentenceConfig::new(dir.path());
        assert!(!config.model_available());

        std::fs::write(dir.path().join("model.safetensors"), b"").unwrap();
        assert!(config.model_available());
    }
}

mod stub_tests {
    use super::*;

    fn embedder() -> SentenceEmbedder {
        SentenceEmbedder::load(SentenceConfig::stub()).expect("stub loads")
    }

    #[test]
    fn test_stub_mode_flags() {
        let e = embedder();
        assert!(e.is_stub());
        assert_eq!(e.mode(), "stub");
        assert_eq!(e.device(), "cpu");
        assert!(format!("{e:?}").contains("Stub"));
    }

    #[test]
    fn test_embed_dimension_and_norm() {
        let v = embedder().embed("A ghost haunts the lighthouse").unwrap();
        assert_eq!(v.len(), SENTENCE_EMBEDDING_DIM);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_embed_custom_dim() {
        let e = SentenceEmbedder::load(SentenceConfig::stub_with_dim(64)).unwrap();
        assert_eq!(e.embed("hello world").unwrap().len(), 64);
        assert_eq!(e.embedding_dim(), 64);
    }

    #[test]
    fn test_embed_deterministic() {
        let e = embedder();
        assert_eq!(
            e.embed("The butler did it").unwrap(),
            e.embed("The butler did it").unwrap()
        );
    }

    #[test]
    fn test_embed_empty_is_error() {
        let e = embedder();
        assert!(matches!(e.embed(""), Err(EmbeddingError::EmptyInput)));
        assert!(matches!(e.embed("  \n\t"), Err(EmbeddingError::EmptyInput)));
    }

    #[test]
    fn test_embed_punctuation_only_is_zero_vector() {
        let v = embedder().embed("?!...").unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_embed_batch_matches_single() {
        let e = embedder();
        let texts = ["The ghost is alive", "Aliens invaded Earth"];
        let batch = e.embed_batch(&texts).unwrap();
        assert_eq!(batch.len(), 2);
        for (text, row) in texts.iter().zip(&batch) {
            assert_eq!(&e.embed(text).unwrap(), row);
        }
        assert!(e.embed_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_paraphrase_closer_than_unrelated() {
        let e = embedder();
        let a = e.embed("The butler did it").unwrap();
        let b = e.embed("The butler committed the murder").unwrap();
        let c = e.embed("Aliens invaded Earth").unwrap();
        assert!(cosine_similarity(&a, &b) > cosine_similarity(&a, &c));
        assert!(cosine_similarity(&a, &b) > 0.5);
    }

    #[test]
    fn test_fingerprint_depends_on_dim() {
        let a = SentenceEmbedder::load(SentenceConfig::stub()).unwrap();
        let b = SentenceEmbedder::load(SentenceConfig::stub_with_dim(64)).unwrap();
        assert_eq!(a.fingerprint(), SentenceEmbedder::stub().fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_missing_model_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = SentenceEmbedder::load(SentenceConfig::new(dir.path())).unwrap_err();
        assert!(matches!(err, EmbeddingError::ModelNotFound { .. }));
    }
}
