//! Architecture Verification Suite
//!
//! The station is shared across tasks (lookup timers, background sync), so
//! its building blocks must stay thread-safe and the trait seams object-safe.

#[cfg(test)]
mod architecture_tests {
    use std::sync::Arc;

    use weighin::assist::LLMProvider;
    use weighin::registry::CsvSource;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_shared_components_are_thread_safe() {
        assert_send_sync::<weighin::RegistryCache>();
        assert_send_sync::<weighin::AnimalMatcher>();
        assert_send_sync::<weighin::LookupController>();
        assert_send_sync::<weighin::RecordStore>();
        assert_send_sync::<weighin::store::KeyStore>();
        assert_send_sync::<weighin::sync::RemoteSync>();
        assert_send_sync::<weighin::assist::Assistant>();
        assert_send_sync::<weighin::export::CsvExporter>();
    }

    #[test]
    fn test_station_is_thread_safe() {
        assert_send_sync::<weighin::WeighStation>();
        assert_send_sync::<weighin::StationParts>();
    }

    // Compile-time check: both seams are usable as trait objects
    #[test]
    fn test_seams_are_object_safe() {
        fn take_sources(_registry: Arc<dyn CsvSource>, _deceased: Arc<dyn CsvSource>) {}
        fn take_provider(_provider: Arc<dyn LLMProvider>) {}

        take_sources(
            Arc::new(weighin::registry::StaticCsvSource::new("registry", "")),
            Arc::new(weighin::registry::StaticCsvSource::new("deceased", "")),
        );
        take_provider(Arc::new(weighin::assist::OllamaProvider::default()));
    }
}
