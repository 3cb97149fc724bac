//! ORDER BY field-list parsing.

use crate::error::{MiniqlError, MiniqlResult};
use crate::lexer::{TokenKind, TokenStream};
use crate::plan::{SortField, SortOrder};

/// Parse the comma-separated `<identifier> [ASC|DESC]` list after
/// `ORDER BY`. A field is only finalized once its direction is known, which
/// is either an explicit keyword or ascending by default at the comma or at
/// end of input.
pub fn parse_order_clause(stream: &mut TokenStream) -> MiniqlResult<Vec<SortField>> {
    let mut fields: Vec<SortField> = Vec::new();
    let mut pending: Option<(String, Option<SortOrder>)> = None;

    loop {
        let tk = stream.next();
        match tk.kind {
            TokenKind::Identifier => {
                if pending.is_some() {
                    return Err(MiniqlError::Parse(format!(
                        "expecting \"DESC\", \"ASC\" or \",\", received \"{}\"",
                        tk.value
                    )));
                }
                pending = Some((tk.value, None));
            }

            TokenKind::Keyword => {
                let Some((_, direction)) = pending.as_mut() else {
                    return Err(MiniqlError::Parse(format!(
                        "unexpected keyword \"{}\", expecting identifier",
                        tk.value
                    )));
                };
                if tk.is_keyword("desc") {
                    *direction = Some(SortOrder::Descending);
                } else if tk.is_keyword("asc") {
                    *direction = Some(SortOrder::Ascending);
                } else {
                    return Err(MiniqlError::Parse(format!(
                        "unexpected keyword \"{}\", expecting \"ASC\", \"DESC\" or \",\"",
                        tk.value
                    )));
                }
            }

            TokenKind::Comma => {
                let Some((column, direction)) = pending.take() else {
                    return Err(MiniqlError::Parse(
                        "unexpected \",\", expecting identifier".to_string(),
                    ));
                };
                fields.push(SortField::new(
                    column,
                    direction.unwrap_or(SortOrder::Ascending),
                ));
            }

            TokenKind::Eof => {
                if pending.is_none() && fields.is_empty() {
                    return Err(MiniqlError::Parse(
                        "unexpected end of input, expecting identifier".to_string(),
                    ));
                }
                if let Some((column, direction)) = pending.take() {
                    fields.push(SortField::new(
                        column,
                        direction.unwrap_or(SortOrder::Ascending),
                    ));
                }
                return Ok(fields);
            }

            _ => {
                return Err(MiniqlError::Parse(format!(
                    "unexpected token \"{}\" on order by field list",
                    tk.value
                )));
            }
        }
    }
}
