/// Model names as registered on the managed platform
pub const DATABASE_MODEL: &str = "Database";
pub const DOCUMENT_MODEL: &str = "Document";
pub const API_KEY_MODEL: &str = "ApiKey";
pub const USAGE_MODEL: &str = "Usage";

/// Field the platform stamps with the writing user's id
pub const OWNER_FIELD: &str = "owner";

/// Declarative description of one platform model
#[derive(Debug)]
pub struct ModelSchema {
    pub name: &'static str,
    /// `(field, target model)` pairs that must reference an existing record
    pub foreign_keys: &'static [(&'static str, &'static str)],
    /// Whether non-owners may read records of this model
    pub public_read: bool,
}

/// Authorization: owner-only write everywhere, public read for Database and
/// Document, owner-only read for ApiKey and Usage.
pub const SCHEMA: &[ModelSchema] = &[
    ModelSchema {
        name: DATABASE_MODEL,
        foreign_keys: &[],
        public_read: true,
    },
    ModelSchema {
        name: DOCUMENT_MODEL,
        foreign_keys: &[("databaseId", DATABASE_MODEL)],
        public_read: true,
    },
    ModelSchema {
        name: API_KEY_MODEL,
        foreign_keys: &[("databaseId", DATABASE_MODEL)],
        public_read: false,
    },
    ModelSchema {
        name: USAGE_MODEL,
        foreign_keys: &[("databaseId", DATABASE_MODEL), ("apiKeyId", API_KEY_MODEL)],
        public_read: false,
    },
];

pub fn lookup(name: &str) -> Option<&'static ModelSchema> {
    SCHEMA.iter().find(|schema| schema.name == name)
}
