//! SELECT bodies of the export views.

use super::ViewDefinitionProvider;
use super::mapping::{ENTITY_CATALOG, EntityDefinition};
use crate::models::DatabaseViewDefinition;
use tracing::warn;

/// View definitions derived from the entity catalog.
#[derive(Debug, Clone, Copy)]
pub struct StaticViewDefinitionProvider {
    catalog: &'static [EntityDefinition],
}

impl Default for StaticViewDefinitionProvider {
    fn default() -> Self {
        Self {
            catalog: ENTITY_CATALOG,
        }
    }
}

impl StaticViewDefinitionProvider {
    /// Provider over the built-in catalog.
    pub fn new() -> Self {
        Self::default()
    }
}

/// `SELECT [a] ,[b] FROM [dbo].[Source]`
fn select_body(entity: &EntityDefinition) -> String {
    let columns = entity
        .columns
        .iter()
        .map(|column| format!("[{column}]"))
        .collect::<Vec<_>>()
        .join(" ,");
    format!("SELECT {columns} FROM [dbo].[{}]", entity.source_table)
}

impl ViewDefinitionProvider for StaticViewDefinitionProvider {
    fn required_views(&self) -> Vec<DatabaseViewDefinition> {
        self.catalog
            .iter()
            .filter_map(|entity| {
                DatabaseViewDefinition::new(entity.view_name(), select_body(entity))
                    .inspect_err(|e| warn!(entity = entity.friendly_name, "Skipping view: {e}"))
                    .ok()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_views_cover_catalog() {
        let views = StaticViewDefinitionProvider::new().required_views();
        let names: Vec<_> = views.iter().map(DatabaseViewDefinition::view_name).collect();

        assert_eq!(
            names,
            vec![
                "dbo.ClientesExportacao",
                "dbo.ProdutosExportacao",
                "dbo.ContasReceberExportacao",
                "dbo.ContasPagarExportacao",
                "dbo.NFeExportacao",
                "dbo.NFCeExportacao",
                "dbo.NotasExportacao"
            ]
        );
    }

    #[test]
    fn test_nfe_view_body() {
        let views = StaticViewDefinitionProvider::new().required_views();
        let nfe = views
            .iter()
            .find(|v| v.view_name() == "dbo.NFeExportacao")
            .map(DatabaseViewDefinition::sql_definition);

        assert_eq!(
            nfe,
            Some(
                "SELECT [cnpj_emitente] ,[numero_documento] ,[codigo_numerico] ,[chave] \
                 ,[protocolo] ,[recebido_em] ,[xml_autorizado] FROM [dbo].[NFe]"
            )
        );
    }
}
