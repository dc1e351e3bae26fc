use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use finadmin_audit::AuditLogService;
use finadmin_core::{CallerContext, SystemSetting, ValidationRule};

use crate::editor::{Editor, Mutation};
use crate::error::{EditorError, ValidationError};
use crate::store::RecordStore;
use crate::validate::parse_document;

/// A system setting as typed into the editor. `value` is JSON text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingForm {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
}

impl SettingForm {
    fn into_record(self) -> Result<SystemSetting, ValidationError> {
        Ok(SystemSetting {
            id: String::new(),
            key: self.key.trim().to_owned(),
            value: parse_document("value", &self.value)?,
            description: self.description.filter(|d| !d.trim().is_empty()),
        })
    }
}

/// A validation rule as typed into the editor. `rule_value` is JSON text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ValidationRuleForm {
    pub rule_name: String,
    pub rule_type: String,
    pub rule_value: String,
    pub error_message: Option<String>,
    /// When absent, new rules start active and edited rules keep their
    /// stored flag.
    pub is_active: Option<bool>,
}

impl ValidationRuleForm {
    fn into_record(self, is_active: bool) -> Result<ValidationRule, ValidationError> {
        Ok(ValidationRule {
            id: String::new(),
            rule_name: self.rule_name.trim().to_owned(),
            rule_type: self.rule_type.trim().to_owned(),
            rule_value: parse_document("rule_value", &self.rule_value)?,
            error_message: self.error_message.filter(|m| !m.trim().is_empty()),
            is_active: self.is_active.unwrap_or(is_active),
        })
    }
}

/// Editor for system settings and the validation rules shown beside them.
pub struct SystemSettingsEditor {
    settings: Editor<SystemSetting>,
    rules: Editor<ValidationRule>,
}

impl SystemSettingsEditor {
    pub fn new(
        settings: Arc<dyn RecordStore<SystemSetting>>,
        rules: Arc<dyn RecordStore<ValidationRule>>,
        audit: AuditLogService,
    ) -> Self {
        Self {
            settings: Editor::new(settings, audit.clone()),
            rules: Editor::new(rules, audit),
        }
    }

    /// Reload both collections.
    pub async fn load(&mut self) -> Result<(), EditorError> {
        self.settings.load().await?;
        self.rules.load().await?;
        Ok(())
    }

    pub fn settings(&self) -> &[SystemSetting] {
        self.settings.records()
    }

    pub fn rules(&self) -> &[ValidationRule] {
        self.rules.records()
    }

    pub fn is_stale(&self) -> bool {
        self.settings.is_stale() || self.rules.is_stale()
    }

    /// Look up a setting value by key in the loaded copy.
    pub fn setting(&self, key: &str) -> Option<&serde_json::Value> {
        self.settings()
            .iter()
            .find(|s| s.key == key)
            .map(|s| &s.value)
    }

    pub async fn create_setting(
        &mut self,
        caller: &CallerContext,
        form: SettingForm,
    ) -> Result<Mutation<SystemSetting>, EditorError> {
        let record = form.into_record()?;
        self.settings.create(caller, record).await
    }

    pub async fn update_setting(
        &mut self,
        caller: &CallerContext,
        id: &str,
        form: SettingForm,
    ) -> Result<Mutation<SystemSetting>, EditorError> {
        let record = form.into_record()?;
        self.settings.update(caller, id, record).await
    }

    pub async fn delete_setting(
        &mut self,
        caller: &CallerContext,
        id: &str,
    ) -> Result<Mutation<SystemSetting>, EditorError> {
        self.settings.delete(caller, id).await
    }

    pub async fn create_rule(
        &mut self,
        caller: &CallerContext,
        form: ValidationRuleForm,
    ) -> Result<Mutation<ValidationRule>, EditorError> {
        let record = form.into_record(true)?;
        self.rules.create(caller, record).await
    }

    pub async fn update_rule(
        &mut self,
        caller: &CallerContext,
        id: &str,
        form: ValidationRuleForm,
    ) -> Result<Mutation<ValidationRule>, EditorError> {
        self.rules
            .revise(caller, id, |stored| Ok(form.into_record(stored.is_active)?))
            .await
    }

    pub async fn delete_rule(
        &mut self,
        caller: &CallerContext,
        id: &str,
    ) -> Result<Mutation<ValidationRule>, EditorError> {
        self.rules.delete(caller, id).await
    }

    /// Flip a rule's `is_active`. Only that field is logged.
    pub async fn toggle_rule(
        &mut self,
        caller: &CallerContext,
        id: &str,
    ) -> Result<Mutation<ValidationRule>, EditorError> {
        self.rules
            .modify(
                caller,
                id,
                |r| r.is_active = !r.is_active,
                |r| json!({ "is_active": r.is_active }),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use finadmin_audit::{ActionType, AuditLogFilter, AuditStore, SortOrder};
    use finadmin_audit_memory::MemoryAuditStore;
    use finadmin_core::Principal;

    use super::*;
    use crate::store::MemoryRecordStore;

    fn caller() -> CallerContext {
        CallerContext::authenticated(Principal::new("u1", "ops@example.com"))
    }

    fn editor() -> (SystemSettingsEditor, Arc<MemoryAuditStore>) {
        let audit_store = Arc::new(MemoryAuditStore::new());
        let editor = SystemSettingsEditor::new(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(MemoryRecordStore::new()),
            AuditLogService::new(audit_store.clone()),
        );
        (editor, audit_store)
    }

    fn range_rule(value: &str) -> ValidationRuleForm {
        ValidationRuleForm {
            rule_name: "deposit_amount".into(),
            rule_type: "range".into(),
            rule_value: value.into(),
            ..ValidationRuleForm::default()
        }
    }

    #[tokio::test]
    async fn setting_values_are_parsed_json() {
        let (mut editor, _) = editor();
        let form = SettingForm {
            key: "limits.daily".into(),
            value: r#"{"max": 500}"#.into(),
            description: Some("  ".into()),
        };
        let created = editor.create_setting(&caller(), form).await.unwrap();

        assert_eq!(created.record.description, None);
        assert_eq!(editor.setting("limits.daily"), Some(&json!({"max": 500})));
        let entry = created.audit.entry().unwrap();
        assert_eq!(entry.table_name, "system_settings");
        assert_eq!(entry.new_value.as_ref().unwrap()["value"], json!({"max": 500}));
    }

    #[tokio::test]
    async fn blank_or_malformed_documents_are_rejected() {
        let (mut editor, audit_store) = editor();
        let blank = SettingForm {
            key: "k".into(),
            ..SettingForm::default()
        };
        assert!(matches!(
            editor.create_setting(&caller(), blank).await,
            Err(EditorError::Validation(ValidationError::Required("value")))
        ));
        assert!(matches!(
            editor.create_rule(&caller(), range_rule("{min: 1}")).await,
            Err(EditorError::Validation(ValidationError::InvalidJson {
                field: "rule_value",
                ..
            }))
        ));
        assert!(audit_store.is_empty());
    }

    #[tokio::test]
    async fn toggle_rule_logs_only_the_flag() {
        let (mut editor, audit_store) = editor();
        let rule = editor
            .create_rule(&caller(), range_rule(r#"{"min": 1, "max": 10000}"#))
            .await
            .unwrap()
            .record;

        let toggled = editor.toggle_rule(&caller(), &rule.id).await.unwrap();
        assert!(!toggled.record.is_active);
        assert_eq!(toggled.record.rule_value, json!({"min": 1, "max": 10000}));

        let filter = AuditLogFilter::default()
            .with_table("validation_rules")
            .with_action(ActionType::Update);
        let updates = audit_store
            .list(&filter, SortOrder::default(), 10, 0)
            .await
            .unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].old_value, Some(json!({"is_active": true})));
        assert_eq!(updates[0].new_value, Some(json!({"is_active": false})));
    }

    #[tokio::test]
    async fn update_rule_keeps_stored_flag() {
        let (mut editor, _) = editor();
        let rule = editor
            .create_rule(&caller(), range_rule(r#"{"min": 1}"#))
            .await
            .unwrap()
            .record;
        editor.toggle_rule(&caller(), &rule.id).await.unwrap();

        let updated = editor
            .update_rule(&caller(), &rule.id, range_rule(r#"{"min": 5}"#))
            .await
            .unwrap();
        assert!(!updated.record.is_active);
        assert_eq!(updated.record.rule_value, json!({"min": 5}));

        let entry = updated.audit.entry().unwrap();
        assert_eq!(entry.old_value.as_ref().unwrap()["is_active"], json!(false));
        assert_eq!(entry.new_value.as_ref().unwrap()["is_active"], json!(false));

        let mut enable = range_rule(r#"{"min": 5}"#);
        enable.is_active = Some(true);
        let enabled = editor.update_rule(&caller(), &rule.id, enable).await.unwrap();
        assert!(enabled.record.is_active);
    }

    #[tokio::test]
    async fn settings_and_rules_load_together() {
        let (mut editor, _) = editor();
        assert!(editor.is_stale());
        editor.load().await.unwrap();
        assert!(!editor.is_stale());
        assert!(editor.settings().is_empty());
        assert!(editor.rules().is_empty());
    }
}
