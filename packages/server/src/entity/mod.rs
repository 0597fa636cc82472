pub mod album;
pub mod anniversary;
pub mod entity_file;
pub mod file;
pub mod moment;
pub mod place;
pub mod setting;
pub mod user;
pub mod wish;

/// Every table carries `id`, `created_at`, `updated_at` and a nullable
/// `deleted_at` tombstone.
macro_rules! soft_delete {
    ($($module:ident => $label:literal),+ $(,)?) => {
        $(
            impl crate::repo::SoftDelete for $module::Entity {
                const LABEL: &'static str = $label;

                fn id_column() -> Self::Column {
                    $module::Column::Id
                }

                fn created_at_column() -> Self::Column {
                    $module::Column::CreatedAt
                }

                fn updated_at_column() -> Self::Column {
                    $module::Column::UpdatedAt
                }

                fn deleted_at_column() -> Self::Column {
                    $module::Column::DeletedAt
                }
            }
        )+
    };
}

soft_delete! {
    album => "album",
    anniversary => "anniversary",
    entity_file => "entity file",
    file => "file",
    moment => "moment",
    place => "place",
    setting => "setting",
    user => "user",
    wish => "wish",
}
