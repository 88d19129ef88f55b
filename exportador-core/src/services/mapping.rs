//! Built-in entity catalog and the mapping repository over it.
//!
//! Each exportable entity reads from a dedicated `dbo.<Source>Exportacao`
//! view whose columns mirror the source table one to one.

use super::ExportMappingRepository;
use crate::models::TableMapping;

/// One exportable entity: friendly name, source table and exported columns.
#[derive(Debug, Clone, Copy)]
pub struct EntityDefinition {
    /// Name shown to the operator and used for the CSV file
    pub friendly_name: &'static str,
    /// Table in the `dbo` schema the export view selects from
    pub source_table: &'static str,
    /// Exported columns in file order
    pub columns: &'static [&'static str],
}

impl EntityDefinition {
    /// Schema-qualified name of the export view, e.g. `dbo.ClientesExportacao`.
    pub fn view_name(&self) -> String {
        format!("dbo.{}Exportacao", self.source_table)
    }
}

/// Every entity the tool knows how to export, in presentation order.
pub const ENTITY_CATALOG: &[EntityDefinition] = &[
    EntityDefinition {
        friendly_name: "Clientes",
        source_table: "Clientes",
        columns: &[
            "codigo",
            "razao_social",
            "nome_fantasia",
            "tipo",
            "cpf",
            "cnpj",
            "tipo_contribuinte",
            "inscricao_estadual",
            "inscricao_municipal",
            "situacao",
            "regime_tributario",
            "data_nascimento",
            "numero_pis_inss",
            "sexo",
            "observacao",
            "data_cadastro",
            "cliente",
            "fornecedor",
            "vendedor",
            "entregador",
            "temp_data_ultima_alteracao",
            "email",
            "email_principal",
            "tipo_endereco",
            "endereco",
            "numero",
            "complemento",
            "bairro",
            "uf_cidade",
            "uid_cidade",
            "cep",
            "referencia",
            "tipo_telefone",
            "telefone",
            "nome_contato",
            "telefone_principal",
        ],
    },
    EntityDefinition {
        friendly_name: "Produtos",
        source_table: "Produtos",
        columns: &[
            "codigo",
            "descricao",
            "codigo_barras",
            "referencia",
            "ativo",
            "uid_grupo",
            "uid_marca",
            "uid_unidade_medida",
            "preco_custo",
            "margem_lucro",
            "preco_venda",
            "id_ncm",
            "cest",
            "estoque",
            "codigo_anp",
            "percentual_glp_petroleo",
            "percentual_gas_nacional",
            "percentual_gas_importado",
            "valor_partida",
            "uid_unidade_tributavel",
            "quantidade_unidade_tributavel",
            "data_ultima_atualizacao",
            "codigo_balanca",
            "departamento",
        ],
    },
    EntityDefinition {
        friendly_name: "ContasReceber",
        source_table: "ContasReceber",
        columns: &[
            "numero_parcela",
            "total_parcela",
            "uid_participante",
            "data_emissao",
            "data_vencimento_original",
            "data_vencimento",
            "valor_crediario",
            "valor_juro",
            "valor_desconto",
            "valor_pagar",
            "valor_pago",
            "valor_saldo",
            "uid_usuario_inclusao",
            "data_hora_inclusao",
            "uid_usuario_alteracao",
            "data_hora_alteracao",
            "data_hora_cancelamento",
            "uid_usuario_cancelamento",
            "data_quitacao",
            "codigo",
            "observacao_crediario",
        ],
    },
    EntityDefinition {
        friendly_name: "ContasPagar",
        source_table: "ContasPagar",
        columns: &[
            "numero_parcela",
            "total_parcela",
            "uid_fornecedor",
            "data_emissao",
            "data_vencimento_original",
            "data_vencimento",
            "valor_crediario",
            "valor_juro",
            "valor_desconto",
            "valor_pagar",
            "valor_pago",
            "valor_saldo",
            "uid_usuario_inclusao",
            "data_hora_inclusao",
            "uid_usuario_alteracao",
            "data_hora_alteracao",
            "data_hora_cancelamento",
            "uid_usuario_cancelamento",
            "data_quitacao",
            "codigo",
            "observacao_contas_pagar",
        ],
    },
    EntityDefinition {
        friendly_name: "NFe",
        source_table: "NFe",
        columns: &[
            "cnpj_emitente",
            "numero_documento",
            "codigo_numerico",
            "chave",
            "protocolo",
            "recebido_em",
            "xml_autorizado",
        ],
    },
    EntityDefinition {
        friendly_name: "NFCe",
        source_table: "NFCe",
        columns: &[
            "serie",
            "numero_documento",
            "codigo_numerico",
            "chave",
            "tag_id",
            "protocolo",
            "recebido_em",
            "xml_autorizado",
        ],
    },
    EntityDefinition {
        friendly_name: "Notas",
        source_table: "Notas",
        columns: &[
            "cnpj_fornecedor",
            "uid_fornecedor",
            "numero_documento",
            "serie",
            "chave",
            "xml_final",
        ],
    },
];

/// Mapping repository backed by an in-memory list.
///
/// Lookups are exact (case-sensitive) on the friendly name.
#[derive(Debug, Clone)]
pub struct InMemoryExportMappingRepository {
    entries: Vec<(String, TableMapping)>,
}

impl Default for InMemoryExportMappingRepository {
    fn default() -> Self {
        Self::from_catalog(ENTITY_CATALOG)
    }
}

impl InMemoryExportMappingRepository {
    /// Repository over the built-in [`ENTITY_CATALOG`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository over an arbitrary catalog.
    pub fn from_catalog(catalog: &[EntityDefinition]) -> Self {
        let entries = catalog
            .iter()
            .map(|entity| {
                (
                    entity.friendly_name.to_string(),
                    TableMapping::new(entity.view_name(), entity.columns.join(", ")),
                )
            })
            .collect();
        Self { entries }
    }

    /// Repository over explicit `(friendly name, mapping)` pairs.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, TableMapping)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }
}

impl ExportMappingRepository for InMemoryExportMappingRepository {
    fn get_mapping(&self, friendly_name: &str) -> Option<TableMapping> {
        self.entries
            .iter()
            .find(|(name, _)| name == friendly_name)
            .map(|(_, mapping)| mapping.clone())
    }

    fn friendly_names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_friendly_names() {
        let repo = InMemoryExportMappingRepository::new();
        assert_eq!(
            repo.friendly_names(),
            vec![
                "Clientes",
                "Produtos",
                "ContasReceber",
                "ContasPagar",
                "NFe",
                "NFCe",
                "Notas"
            ]
        );
    }

    #[test]
    fn test_clientes_mapping() {
        let repo = InMemoryExportMappingRepository::new();
        let mapping = repo.get_mapping("Clientes").unwrap();

        assert_eq!(mapping.real_table_name, "dbo.ClientesExportacao");
        assert!(mapping.columns.starts_with("codigo, razao_social, nome_fantasia"));
        assert!(mapping.columns.ends_with("nome_contato, telefone_principal"));
        assert_eq!(mapping.columns.split(", ").count(), 36);
    }

    #[test]
    fn test_contas_pagar_differs_from_receber() {
        let repo = InMemoryExportMappingRepository::new();
        let pagar = repo.get_mapping("ContasPagar").unwrap();
        let receber = repo.get_mapping("ContasReceber").unwrap();

        assert!(pagar.columns.contains("uid_fornecedor"));
        assert!(pagar.columns.ends_with("observacao_contas_pagar"));
        assert!(receber.columns.contains("uid_participante"));
        assert!(receber.columns.ends_with("observacao_crediario"));
    }

    #[test]
    fn test_unknown_and_case_mismatch() {
        let repo = InMemoryExportMappingRepository::new();
        assert!(repo.get_mapping("Fornecedores").is_none());
        assert!(repo.get_mapping("clientes").is_none());
    }

    #[test]
    fn test_from_entries() {
        let repo = InMemoryExportMappingRepository::from_entries([(
            "Clientes".to_string(),
            TableMapping::new("dbo.Clientes", ""),
        )]);
        assert_eq!(repo.friendly_names(), vec!["Clientes"]);
        assert!(repo.get_mapping("Produtos").is_none());
    }
}
