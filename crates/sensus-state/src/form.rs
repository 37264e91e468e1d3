//! Form state with eager per-field validation
//!
//! Values live in an ordered field map derived from a typed initial value, so
//! any `Serialize + DeserializeOwned` payload can back a form. Every change
//! re-runs that field's validator; submission re-runs all of them and only
//! calls the handler when none fails.

use futures::{FutureExt, future::BoxFuture};
use indexmap::IndexMap;
use sensus_client::ClientError;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Number, Value};
use std::{fmt, future::Future, marker::PhantomData, sync::Arc};
use tokio::sync::watch;
use tracing::{debug, error};

/// Field name to value, in declaration order
pub type Values = IndexMap<String, FieldValue>;

type Validator = Arc<dyn Fn(&FieldValue, &Values) -> Option<String> + Send + Sync>;
type SubmitHandler<T> = Arc<dyn Fn(T) -> BoxFuture<'static, Result<(), ClientError>> + Send + Sync>;

/// A single form value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Nothing entered
    Empty,
    /// Free text, dates and select options
    Text(String),
    /// Parsed numeric input; `NaN` when the input was not a number
    Number(f64),
    /// Checkbox state
    Bool(bool),
}

impl FieldValue {
    /// Numeric view; text is parsed, anything unparsable is `NaN`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Empty => None,
            Self::Number(n) => Some(*n),
            Self::Text(s) if s.trim().is_empty() => None,
            Self::Text(s) => Some(s.trim().parse().unwrap_or(f64::NAN)),
            Self::Bool(b) => Some(f64::from(u8::from(*b))),
        }
    }

    /// Whole non-negative count, if the value is one
    pub fn as_count(&self) -> Option<u32> {
        let n = self.as_f64()?;
        (n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX))
            .then(|| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let count = n as u32;
                count
            })
    }

    /// Text content
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Empty, or text with nothing but whitespace
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) | Self::Bool(_) => false,
        }
    }

    fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n.as_f64().map_or(Self::Empty, Self::Number),
            Value::String(s) => Self::Text(s),
            other => Self::Text(other.to_string()),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Text(s) => Value::String(s.clone()),
            #[allow(clippy::cast_possible_truncation)]
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => Value::from(*n as i64),
            Self::Number(n) => Number::from_f64(*n).map_or(Value::Null, Value::Number),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Declared type of the input a change came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// Free text
    Text,
    /// Numeric input
    Number,
    /// `YYYY-MM-DD` date picker
    Date,
    /// Option list
    Select,
    /// Checkbox
    Checkbox,
}

/// A raw input change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Input type
    pub kind: InputKind,
    /// Raw input text
    pub value: String,
    /// Checkbox state
    pub checked: bool,
}

impl ChangeEvent {
    /// Change from an input of `kind`
    pub fn new(kind: InputKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            checked: false,
        }
    }

    /// Numeric input change
    pub fn number(value: impl Into<String>) -> Self {
        Self::new(InputKind::Number, value)
    }

    /// Text input change
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(InputKind::Text, value)
    }

    /// Checkbox toggle
    pub fn checkbox(checked: bool) -> Self {
        Self {
            kind: InputKind::Checkbox,
            value: String::new(),
            checked,
        }
    }

    /// Value parsed according to the input type
    pub fn parse(&self) -> FieldValue {
        match self.kind {
            InputKind::Number => {
                let raw = self.value.trim();
                if raw.is_empty() {
                    FieldValue::Empty
                } else {
                    FieldValue::Number(raw.parse().unwrap_or(f64::NAN))
                }
            }
            InputKind::Checkbox => FieldValue::Bool(self.checked),
            InputKind::Text | InputKind::Date | InputKind::Select => {
                FieldValue::Text(self.value.clone())
            }
        }
    }
}

/// Where the form is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormPhase {
    /// Untouched since creation or the last reset
    Pristine,
    /// Edited, or carrying errors from a failed submit
    Editing,
    /// Submit handler running
    Submitting,
}

/// Result of [`FormState::handle_submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A validator failed; the handler was not called
    Invalid,
    /// The handler succeeded
    Submitted,
    /// The handler failed; field errors were merged, anything else was logged
    Failed(String),
    /// Values are valid but no handler is registered
    NoHandler,
}

/// Holds the submitting flag up until dropped, including when the submit
/// future itself is dropped mid-handler
struct SubmittingGuard<'a>(&'a watch::Sender<bool>);

impl<'a> SubmittingGuard<'a> {
    fn raise(flag: &'a watch::Sender<bool>) -> Self {
        flag.send_replace(true);
        Self(flag)
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

/// Form values, errors and submission state backed by a typed payload `T`
pub struct FormState<T> {
    initial: Values,
    values: Values,
    errors: IndexMap<String, String>,
    rules: IndexMap<String, Validator>,
    on_submit: Option<SubmitHandler<T>>,
    submitting: watch::Sender<bool>,
    touched: bool,
    reset_on_success: bool,
    _payload: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for FormState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
            .field("values", &self.values)
            .field("errors", &self.errors)
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .field("submitting", &*self.submitting.borrow())
            .field("touched", &self.touched)
            .finish_non_exhaustive()
    }
}

impl<T> FormState<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Build a form whose fields are the fields of `initial`
    ///
    /// Fails when `initial` does not serialize to a JSON object.
    pub fn new(initial: &T) -> sensus_core::Result<Self> {
        let Value::Object(map) = serde_json::to_value(initial)? else {
            return Err(sensus_core::Error::Other(
                "form values must serialize to an object".to_string(),
            ));
        };
        let initial: Values = map
            .into_iter()
            .map(|(field, value)| (field, FieldValue::from_json(value)))
            .collect();
        let (submitting, _) = watch::channel(false);

        Ok(Self {
            values: initial.clone(),
            initial,
            errors: IndexMap::new(),
            rules: IndexMap::new(),
            on_submit: None,
            submitting,
            touched: false,
            reset_on_success: false,
            _payload: PhantomData,
        })
    }

    /// Validate `field` on its own value
    #[must_use]
    pub fn rule(
        self,
        field: impl Into<String>,
        check: impl Fn(&FieldValue) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.rule_with_values(field, move |value, _| check(value))
    }

    /// Validate `field` with access to every value
    #[must_use]
    pub fn rule_with_values(
        mut self,
        field: impl Into<String>,
        check: impl Fn(&FieldValue, &Values) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.rules.insert(field.into(), Arc::new(check));
        self
    }

    /// Handler called with the typed values on a valid submit
    #[must_use]
    pub fn on_submit<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ClientError>> + Send + 'static,
    {
        self.on_submit = Some(Arc::new(move |values| handler(values).boxed()));
        self
    }

    /// Restore the initial values after a successful submit
    #[must_use]
    pub const fn reset_on_success(mut self, reset: bool) -> Self {
        self.reset_on_success = reset;
        self
    }

    /// Current values
    pub const fn values(&self) -> &Values {
        &self.values
    }

    /// Current value of one field
    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Current field errors; an empty message means no error
    pub const fn errors(&self) -> &IndexMap<String, String> {
        &self.errors
    }

    /// Error of one field
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .map(String::as_str)
            .filter(|message| !message.is_empty())
    }

    /// Whether the submit handler is running
    pub fn loading(&self) -> bool {
        *self.submitting.borrow()
    }

    /// Receiver that observes the submitting flag
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.submitting.subscribe()
    }

    /// No field holds a non-empty error
    pub fn is_valid(&self) -> bool {
        self.errors.values().all(String::is_empty)
    }

    /// Lifecycle phase
    pub fn phase(&self) -> FormPhase {
        if self.loading() {
            FormPhase::Submitting
        } else if self.touched || !self.is_valid() {
            FormPhase::Editing
        } else {
            FormPhase::Pristine
        }
    }

    /// Store a parsed input change, then re-validate that field
    pub fn handle_change(&mut self, field: &str, event: &ChangeEvent) {
        let value = event.parse();
        self.values.insert(field.to_string(), value);
        self.touched = true;
        self.errors.shift_remove(field);

        if let Some(message) = self.run_rule(field) {
            self.errors.insert(field.to_string(), message);
        }
    }

    /// Set a value directly, clearing its error without re-validating
    pub fn set_field_value(&mut self, field: &str, value: FieldValue) {
        self.values.insert(field.to_string(), value);
        self.touched = true;
        self.errors.shift_remove(field);
    }

    /// Set an error directly
    pub fn set_field_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.insert(field.to_string(), message.into());
    }

    /// Drop every error
    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Restore the initial values and clear errors and loading
    pub fn reset_form(&mut self) {
        self.values.clone_from(&self.initial);
        self.errors.clear();
        self.touched = false;
        self.submitting.send_replace(false);
    }

    /// Run every validator, replacing the error map; `true` when all pass
    pub fn validate_form(&mut self) -> bool {
        let errors: IndexMap<_, _> = self
            .values
            .keys()
            .filter_map(|field| self.run_rule(field).map(|message| (field.clone(), message)))
            .collect();
        let valid = errors.is_empty();
        self.errors = errors;
        valid
    }

    /// Current values as the typed payload
    pub fn typed_values(&self) -> sensus_core::Result<T> {
        let map: Map<String, Value> = self
            .values
            .iter()
            .map(|(field, value)| (field.clone(), value.to_json()))
            .collect();
        Ok(serde_json::from_value(Value::Object(map))?)
    }

    /// Validate and, when every field passes, run the submit handler
    pub async fn handle_submit(&mut self) -> SubmitOutcome {
        if !self.validate_form() {
            debug!(errors = self.errors.len(), "form submit blocked by validation");
            return SubmitOutcome::Invalid;
        }
        let Some(handler) = self.on_submit.clone() else {
            return SubmitOutcome::NoHandler;
        };
        let payload = match self.typed_values() {
            Ok(payload) => payload,
            Err(err) => {
                error!(error = %err, "form values do not match the payload type");
                return SubmitOutcome::Failed(err.to_string());
            }
        };

        let result = {
            let _submitting = SubmittingGuard::raise(&self.submitting);
            handler(payload).await
        };

        match result {
            Ok(()) => {
                debug!("form submitted");
                if self.reset_on_success {
                    self.reset_form();
                }
                SubmitOutcome::Submitted
            }
            Err(err) => {
                if let Some(field_errors) = err.field_errors() {
                    for (field, message) in field_errors {
                        self.errors.insert(field.clone(), message.clone());
                    }
                } else {
                    error!(error = %err, "form submission failed");
                }
                SubmitOutcome::Failed(err.user_message())
            }
        }
    }

    fn run_rule(&self, field: &str) -> Option<String> {
        let rule = self.rules.get(field)?;
        let value = self.values.get(field).unwrap_or(&FieldValue::Empty);
        rule(value, &self.values).filter(|message| !message.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Ward {
        nama: String,
        kapasitas: u32,
        aktif: bool,
        catatan: Option<String>,
    }

    fn ward() -> Ward {
        Ward {
            nama: "Melati".to_string(),
            kapasitas: 20,
            aktif: true,
            catatan: None,
        }
    }

    fn required(value: &FieldValue) -> Option<String> {
        value.is_blank().then(|| "Wajib diisi".to_string())
    }

    #[rstest]
    #[case(ChangeEvent::number("12"), FieldValue::Number(12.0))]
    #[case(ChangeEvent::number(""), FieldValue::Empty)]
    #[case(ChangeEvent::text("12"), FieldValue::Text("12".to_string()))]
    #[case(ChangeEvent::checkbox(true), FieldValue::Bool(true))]
    #[case(ChangeEvent::new(InputKind::Date, "2025-03-01"), FieldValue::Text("2025-03-01".to_string()))]
    fn test_change_parsing(#[case] event: ChangeEvent, #[case] expected: FieldValue) {
        assert_eq!(event.parse(), expected);
    }

    #[test]
    fn test_unparsable_number_is_nan() {
        let value = ChangeEvent::number("dua").parse();
        assert!(value.as_f64().unwrap().is_nan());
        assert_eq!(value.as_count(), None);
    }

    #[test]
    fn test_fields_follow_payload() {
        let form = FormState::new(&ward()).unwrap();
        let fields: Vec<_> = form.values().keys().cloned().collect();
        assert_eq!(fields, vec!["nama", "kapasitas", "aktif", "catatan"]);
        assert_eq!(form.value("catatan"), Some(&FieldValue::Empty));
        assert_eq!(form.typed_values().unwrap(), ward());
        assert_eq!(form.phase(), FormPhase::Pristine);
    }

    #[test]
    fn test_change_validates_eagerly() {
        let mut form = FormState::new(&ward()).unwrap().rule("nama", required);

        form.handle_change("nama", &ChangeEvent::text("  "));
        assert_eq!(form.error("nama"), Some("Wajib diisi"));
        assert!(!form.is_valid());

        form.handle_change("nama", &ChangeEvent::text("Mawar"));
        assert_eq!(form.error("nama"), None);
        assert!(form.is_valid());
        assert_eq!(form.phase(), FormPhase::Editing);
    }

    #[test]
    fn test_cross_field_rule_sees_all_values() {
        let mut form = FormState::new(&ward()).unwrap().rule_with_values(
            "kapasitas",
            |value, values| {
                let active = values.get("aktif") == Some(&FieldValue::Bool(true));
                (active && value.as_count() == Some(0))
                    .then(|| "Bangsal aktif harus punya kapasitas".to_string())
            },
        );

        form.handle_change("kapasitas", &ChangeEvent::number("0"));
        assert!(form.error("kapasitas").is_some());

        form.handle_change("aktif", &ChangeEvent::checkbox(false));
        form.handle_change("kapasitas", &ChangeEvent::number("0"));
        assert!(form.error("kapasitas").is_none());
    }

    #[tokio::test]
    async fn test_empty_required_field_blocks_submit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut form = FormState::new(&ward())
            .unwrap()
            .rule("nama", required)
            .on_submit(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            });

        form.set_field_value("nama", FieldValue::Text(String::new()));
        assert_eq!(form.handle_submit().await, SubmitOutcome::Invalid);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(form.error("nama"), Some("Wajib diisi"));
    }

    #[tokio::test]
    async fn test_submit_passes_typed_values() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut form = FormState::new(&ward()).unwrap().on_submit(move |ward: Ward| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(ward);
                Ok(())
            }
        });

        form.handle_change("kapasitas", &ChangeEvent::number("24"));
        form.handle_change("catatan", &ChangeEvent::text("Lantai 2"));
        assert_eq!(form.handle_submit().await, SubmitOutcome::Submitted);

        let submitted = rx.recv().await.unwrap();
        assert_eq!(submitted.kapasitas, 24);
        assert_eq!(submitted.catatan.as_deref(), Some("Lantai 2"));
        assert!(!form.loading());
    }

    #[tokio::test]
    async fn test_server_field_errors_are_merged() {
        let mut form = FormState::new(&ward()).unwrap().on_submit(|_| async {
            Err(ClientError::field("nama", "Nama bangsal sudah digunakan"))
        });
        form.set_field_error("catatan", "Terlalu panjang");

        let outcome = form.handle_submit().await;
        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert_eq!(form.error("nama"), Some("Nama bangsal sudah digunakan"));
        assert_eq!(form.phase(), FormPhase::Editing);
        assert!(!form.loading());
    }

    #[tokio::test]
    async fn test_other_failures_are_swallowed() {
        let mut form = FormState::new(&ward())
            .unwrap()
            .on_submit(|_| async { Err(ClientError::network("connection refused")) });

        let outcome = form.handle_submit().await;
        assert_eq!(
            outcome,
            SubmitOutcome::Failed("Koneksi terputus, periksa jaringan".to_string())
        );
        assert!(form.errors().is_empty());
    }

    #[tokio::test]
    async fn test_reset_restores_initial_values() {
        let mut form = FormState::new(&ward()).unwrap().rule("nama", required);
        let initial = form.values().clone();

        form.handle_change("nama", &ChangeEvent::text(""));
        form.handle_change("kapasitas", &ChangeEvent::number("99"));
        form.handle_change("aktif", &ChangeEvent::checkbox(false));
        assert!(!form.is_valid());

        form.reset_form();
        assert_eq!(form.values(), &initial);
        assert!(form.errors().is_empty());
        assert!(!form.loading());
        assert_eq!(form.phase(), FormPhase::Pristine);
    }

    #[tokio::test]
    async fn test_reset_on_success_returns_to_pristine() {
        let mut form = FormState::new(&ward())
            .unwrap()
            .reset_on_success(true)
            .on_submit(|_| async { Ok(()) });

        form.handle_change("nama", &ChangeEvent::text("Kenanga"));
        assert_eq!(form.handle_submit().await, SubmitOutcome::Submitted);
        assert_eq!(form.value("nama"), Some(&FieldValue::Text("Melati".to_string())));
        assert_eq!(form.phase(), FormPhase::Pristine);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_submit_clears_submitting() {
        let mut form = FormState::new(&ward()).unwrap().on_submit(|_| async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            Ok(())
        });
        let mut submitting = form.subscribe();

        let abandoned =
            tokio::time::timeout(std::time::Duration::from_secs(1), form.handle_submit()).await;

        assert!(abandoned.is_err());
        assert!(!form.loading());
        assert_ne!(form.phase(), FormPhase::Submitting);
        assert!(submitting.has_changed().unwrap());
        assert!(!*submitting.borrow_and_update());
    }

    #[test]
    fn test_no_handler() {
        let mut form = FormState::new(&ward()).unwrap();
        assert_eq!(tokio_test::block_on(form.handle_submit()), SubmitOutcome::NoHandler);
    }
}
