//! File records: one template file's tracked parameters.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use log::debug;
use metamod_tag::{CanonicalKey, Marker, TagError};
use serde::{Deserialize, Serialize};

use crate::{
    error::GenerateError,
    parameter::{CorpusParameter, CustomParameter, ParameterInstance},
    registry::ParameterTypeRegistry,
};

/// One template file inside a project.
///
/// The parameter map holds one entry per distinct canonical key found in
/// the file, in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    path: PathBuf,
    #[serde(with = "indexmap::map::serde_seq")]
    parameters: IndexMap<CanonicalKey, ParameterInstance>,
}

/// What a rescan changed relative to the previous record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RescanSummary {
    /// How many existing parameters were carried forward unchanged
    pub carried: usize,
    /// Keys discovered for the first time
    pub added: Vec<CanonicalKey>,
    /// Keys that no longer appear in the file
    pub dropped: Vec<CanonicalKey>,
}

impl FileRecord {
    /// Scans a template file's content for markers and registers each
    /// distinct canonical key with a fresh parameter instance.
    ///
    /// `path` is the file's location relative to the project root.
    ///
    /// # Errors
    ///
    /// Returns an error if a marker in the text is malformed in a way the
    /// scan cannot skip (a duplicated argument key).
    pub fn scan<R>(path: impl Into<PathBuf>, text: &str, registry: &R) -> Result<Self, TagError>
    where
        R: ParameterTypeRegistry + ?Sized,
    {
        let path = path.into();
        let mut parameters = IndexMap::new();

        for marker in metamod_tag::find_all(text)? {
            let key = marker.canonical_key();
            if !parameters.contains_key(&key) {
                debug!("registered parameter `{key}` in {}", path.display());
                parameters.insert(key, new_instance(&marker, registry));
            }
        }

        Ok(Self { path, parameters })
    }

    /// Returns the file's path relative to the project root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the tracked parameters in first-seen order.
    pub fn parameters(&self) -> &IndexMap<CanonicalKey, ParameterInstance> {
        &self.parameters
    }

    /// Returns a mutable handle to one tracked parameter.
    pub fn parameter_mut(&mut self, key: &CanonicalKey) -> Option<&mut ParameterInstance> {
        self.parameters.get_mut(key)
    }

    /// Returns true if every tracked parameter is complete.
    pub fn is_complete(&self) -> bool {
        self.parameters.values().all(ParameterInstance::is_complete)
    }

    /// Rescans the file's current content, merging with this record.
    ///
    /// Keys that already existed carry their parameter instance forward
    /// unchanged, so values entered before an unrelated edit survive it.
    /// New keys get a fresh instance; keys no longer present are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if a marker in the text repeats an argument key.
    pub fn rescan<R>(&self, text: &str, registry: &R) -> Result<(Self, RescanSummary), TagError>
    where
        R: ParameterTypeRegistry + ?Sized,
    {
        let mut parameters = IndexMap::new();
        let mut summary = RescanSummary::default();

        for marker in metamod_tag::find_all(text)? {
            let key = marker.canonical_key();
            if parameters.contains_key(&key) {
                continue;
            }

            match self.parameters.get(&key) {
                Some(existing) => {
                    summary.carried += 1;
                    parameters.insert(key, existing.clone());
                }
                None => {
                    debug!("new parameter `{key}` in {}", self.path.display());
                    summary.added.push(key.clone());
                    parameters.insert(key, new_instance(&marker, registry));
                }
            }
        }

        summary.dropped = self
            .parameters
            .keys()
            .filter(|key| !parameters.contains_key(*key))
            .cloned()
            .collect();

        let record = Self {
            path: self.path.clone(),
            parameters,
        };

        Ok((record, summary))
    }

    /// Substitutes every tracked marker occurrence in `text` with its
    /// parameter's rendered value and returns the resulting output text.
    ///
    /// Occurrences are replaced one by one, so two spellings of the same
    /// logical parameter (say quoted and unquoted argument values) both
    /// resolve to the shared value.
    ///
    /// # Errors
    ///
    /// Returns an error if any tracked parameter is incomplete, or if a
    /// tracked key no longer appears anywhere in the text (the file changed
    /// between scan and generation).
    pub fn generate(&self, text: &str) -> Result<String, GenerateError> {
        if let Some((key, _)) = self
            .parameters
            .iter()
            .find(|(_, parameter)| !parameter.is_complete())
        {
            return Err(GenerateError::IncompleteParameter { key: key.clone() });
        }

        let markers = metamod_tag::find_all(text).map_err(GenerateError::MarkerNotFound)?;

        let present: HashSet<CanonicalKey> = markers.iter().map(Marker::canonical_key).collect();
        for key in self.parameters.keys() {
            if !present.contains(key) {
                metamod_tag::find_marker_for(key, text).map_err(GenerateError::MarkerNotFound)?;
            }
        }

        let mut output = String::with_capacity(text.len());
        let mut position = 0;
        for marker in &markers {
            let key = marker.canonical_key();
            let Some(parameter) = self.parameters.get(&key) else {
                continue;
            };
            let Some(value) = parameter.value() else {
                return Err(GenerateError::IncompleteParameter { key });
            };

            output.push_str(&text[position..marker.offset()]);
            output.push_str(&value.to_string());
            position = marker.offset() + marker.raw().len();
        }
        output.push_str(&text[position..]);

        Ok(output)
    }

    /// Returns the sibling path generation writes to.
    pub fn output_path(&self) -> PathBuf {
        output_file_name(&self.path)
    }
}

/// Rewrites the template naming marker out of a path: `foo.mm_py` becomes
/// `foo.py`.
pub fn output_file_name(path: &Path) -> PathBuf {
    match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => path.with_file_name(name.replacen(".mm_", ".", 1)),
        None => path.to_path_buf(),
    }
}

fn new_instance<R>(marker: &Marker, registry: &R) -> ParameterInstance
where
    R: ParameterTypeRegistry + ?Sized,
{
    match registry.lookup_type_id(marker.name()) {
        Some(type_id) => {
            ParameterInstance::Corpus(CorpusParameter::new(type_id, marker.arguments().clone()))
        }
        None => ParameterInstance::Custom(CustomParameter::new(marker.arguments().clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ParameterTypeId, StaticRegistry};

    const TEMPLATE: &str = "\
tau = #|tau_m(unit=ms)|#
v_rest = #|v_rest(unit=\"mV\")|#
tau_again = #|tau_m(unit=ms)|#
";

    fn registry() -> StaticRegistry {
        let mut registry = StaticRegistry::new();
        registry.insert("tau_m", ParameterTypeId::new("101"));
        registry
    }

    fn complete(record: &mut FileRecord) {
        let keys: Vec<_> = record.parameters().keys().cloned().collect();
        for key in keys {
            let parameter = record.parameter_mut(&key).expect("key should exist");
            parameter.set_value(5.0, "ms");
            if let Some(custom) = parameter.as_custom_mut() {
                custom.set_justification("chosen for the test");
            }
        }
    }

    mod success {
        use super::*;

        #[test]
        fn scan_deduplicates_by_canonical_key() {
            let record =
                FileRecord::scan("model.mm_py", TEMPLATE, &registry()).expect("should scan");
            assert_eq!(record.parameters().len(), 2);
        }

        #[test]
        fn registry_binding_selects_the_variant() {
            let record =
                FileRecord::scan("model.mm_py", TEMPLATE, &registry()).expect("should scan");

            let mut values = record.parameters().values();
            let tau = values.next().expect("tau_m should be tracked");
            let v_rest = values.next().expect("v_rest should be tracked");
            assert!(matches!(tau, ParameterInstance::Corpus(_)));
            assert!(matches!(v_rest, ParameterInstance::Custom(_)));
        }

        #[test]
        fn rescan_of_unchanged_text_preserves_every_parameter() {
            let mut record =
                FileRecord::scan("model.mm_py", TEMPLATE, &registry()).expect("should scan");
            complete(&mut record);

            let (rescanned, summary) = record
                .rescan(TEMPLATE, &registry())
                .expect("should rescan");

            assert_eq!(rescanned, record);
            assert_eq!(summary.carried, 2);
            assert!(summary.added.is_empty());
            assert!(summary.dropped.is_empty());
        }

        #[test]
        fn rescan_with_a_new_placeholder_adds_exactly_one() {
            let mut record =
                FileRecord::scan("model.mm_py", TEMPLATE, &registry()).expect("should scan");
            complete(&mut record);

            let edited = format!("{TEMPLATE}g_leak = #|g_leak|#\n");
            let (rescanned, summary) = record
                .rescan(&edited, &registry())
                .expect("should rescan");

            assert_eq!(rescanned.parameters().len(), 3);
            assert_eq!(summary.carried, 2);
            assert_eq!(summary.added.len(), 1);
            assert_eq!(summary.added[0].name(), "g_leak");

            let added = &rescanned.parameters()[&summary.added[0]];
            assert!(!added.is_complete());
            for key in record.parameters().keys() {
                assert_eq!(rescanned.parameters()[key], record.parameters()[key]);
            }
        }

        #[test]
        fn rescan_drops_keys_no_longer_present() {
            let record =
                FileRecord::scan("model.mm_py", TEMPLATE, &registry()).expect("should scan");

            let (rescanned, summary) = record
                .rescan("only tau now: #|tau_m(unit=ms)|#", &registry())
                .expect("should rescan");

            assert_eq!(rescanned.parameters().len(), 1);
            assert_eq!(summary.dropped.len(), 1);
            assert_eq!(summary.dropped[0].name(), "v_rest");
        }

        #[test]
        fn generate_substitutes_every_occurrence() {
            let mut record =
                FileRecord::scan("model.mm_py", TEMPLATE, &registry()).expect("should scan");
            complete(&mut record);

            let output = record.generate(TEMPLATE).expect("should generate");

            assert!(!output.contains("#|"));
            assert_eq!(output.matches('5').count(), 3);
        }

        #[test]
        fn generate_resolves_every_spelling_of_a_key() {
            // quote-stripping makes these the same logical parameter
            let text = "a = #|v(unit=\"mV\")|#\nb = #|v(unit=mV)|#\n";
            let mut record = FileRecord::scan("m.mm_py", text, &StaticRegistry::new())
                .expect("should scan");
            assert_eq!(record.parameters().len(), 1);
            complete(&mut record);

            let output = record.generate(text).expect("should generate");
            assert_eq!(output, "a = 5\nb = 5\n");
            assert!(!output.contains("#|"));
        }

        #[test]
        fn generated_values_render_with_display() {
            let text = "x = #|x|#";
            let mut record = FileRecord::scan("m.mm_py", text, &StaticRegistry::new())
                .expect("should scan");
            complete(&mut record);

            let output = record.generate(text).expect("should generate");
            assert_eq!(output, "x = 5");
        }

        #[test]
        fn output_path_rewrites_the_template_marker() {
            assert_eq!(
                output_file_name(Path::new("models/neuron.mm_py")),
                Path::new("models/neuron.py")
            );
            assert_eq!(
                output_file_name(Path::new("net.mm_hoc")),
                Path::new("net.hoc")
            );
        }
    }

    mod error {
        use super::*;

        #[test]
        fn generate_refuses_incomplete_parameters() {
            let record =
                FileRecord::scan("model.mm_py", TEMPLATE, &registry()).expect("should scan");

            let err = record
                .generate(TEMPLATE)
                .expect_err("should refuse incomplete parameters");
            assert!(matches!(err, GenerateError::IncompleteParameter { .. }));
        }

        #[test]
        fn generate_reports_a_vanished_marker() {
            let mut record =
                FileRecord::scan("model.mm_py", TEMPLATE, &registry()).expect("should scan");
            complete(&mut record);

            let err = record
                .generate("the markers are gone")
                .expect_err("should report the missing marker");
            assert!(matches!(err, GenerateError::MarkerNotFound(_)));
        }

        #[test]
        fn scan_propagates_duplicate_argument_errors() {
            let err = FileRecord::scan("m.mm_py", "#|x(a=1, a=2)|#", &StaticRegistry::new())
                .expect_err("should reject duplicate argument keys");
            assert!(matches!(
                err.reason,
                metamod_tag::TagErrorReason::DuplicateArgument { .. }
            ));
        }
    }
}
