use thiserror::Error;

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Falha ao criar PDF: {0}")]
    PdfError(String),
    #[error("Data inválida: {0}")]
    DateError(String),
    #[error("Roteiro inválido: {0}")]
    ScriptError(String),
    #[error("Item inválido: {0}")]
    ItemError(String),
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error("Erro de E/S: {0}")]
    IoError(#[from] std::io::Error),
}

/// Rejected item workflow transitions. The draft is never modified when one
/// of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Não é possível adicionar um item durante uma edição")]
    NotIdle,
    #[error("Nenhum item em edição")]
    NotEditing,
    #[error("Índice {index} fora do intervalo (itens: {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Campo desconhecido: {0}")]
    UnknownField(String),
}
