use serde::Serialize;
use serde_json::{json, Value};

use almanac_core::IntentKind;

/// Function schema advertised to the classification service.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl FunctionDeclaration {
    pub fn for_intent(kind: IntentKind) -> Self {
        let (description, parameters) = match kind {
            IntentKind::ListAll => (
                "Fetches all the updates in the database",
                json!({"type": "object", "properties": {}}),
            ),
            IntentKind::Add => (
                "Adds a specific event to the database",
                json!({
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "description": "Name of the upcoming event"},
                        "date": {
                            "type": "string",
                            "description": "Date of the upcoming event (e.g., '2025-12-13')"
                        }
                    },
                    "required": ["name", "date"]
                }),
            ),
            IntentKind::Update => (
                "Updates a specific event based on the name to the database",
                json!({
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "description": "Name of the event"},
                        "date": {
                            "type": "string",
                            "description": "Updated date of the event (e.g., '2025-12-13')"
                        }
                    },
                    "required": ["name", "date"]
                }),
            ),
            IntentKind::ListBeforeDate => (
                "Fetches all events before a specific date",
                json!({
                    "type": "object",
                    "properties": {
                        "date": {
                            "type": "string",
                            "description": "Date before which all events are required (e.g., '2024-07-29')"
                        }
                    },
                    "required": ["date"]
                }),
            ),
            IntentKind::FindByName => (
                "Fetches date for a specific event.",
                json!({
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "description": "Name of the required event"}
                    },
                    "required": ["name"]
                }),
            ),
        };

        Self { name: kind.function_name().to_string(), description: description.to_string(), parameters }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ToolRegistry {
    declarations: Vec<FunctionDeclaration>,
}

impl ToolRegistry {
    /// Registry advertising every supported event function.
    pub fn event_functions() -> Self {
        let mut registry = Self::default();
        for kind in IntentKind::ALL {
            registry.register(FunctionDeclaration::for_intent(kind));
        }
        registry
    }

    /// Registering a name twice replaces the earlier declaration in place.
    pub fn register(&mut self, declaration: FunctionDeclaration) {
        match self.declarations.iter_mut().find(|existing| existing.name == declaration.name) {
            Some(existing) => *existing = declaration,
            None => self.declarations.push(declaration),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FunctionDeclaration> {
        self.declarations.iter().find(|declaration| declaration.name == name)
    }

    pub fn declarations(&self) -> &[FunctionDeclaration] {
        &self.declarations
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}
