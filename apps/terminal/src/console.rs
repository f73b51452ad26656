//! # Operator Console
//!
//! Reads one command per line from stdin, dispatches it to the command
//! layer and prints the JSON response or `[CODE] message`.
//!
//! ## Line Grammar
//! ```text
//! line     := command arg*
//! arg      := word | "quoted words"
//! product  := full id | unique id prefix | exact name
//! amount   := integer in the currency's minor unit
//! ```

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::commands::{cart, product, sale, session, shift};
use crate::error::ApiError;
use crate::state::{ConfigState, DbState, EngineState, SessionState};
use till_core::PaymentMethod;

const HELP: &str = "\
Catalog
  products                                   list products
  add-product <name> <price> <stock> <category>
  edit-product <product> field=value...      fields: name price stock category
  remove-product <product>
  alerts                                     low and out-of-stock products
Cart
  cart                                       show the cart
  add <product> [qty]                        add units (default 1)
  qty <product> <qty>                        set quantity, 0 removes
  remove <product>                           drop a line
  clear                                      empty the cart
Sales
  checkout [amount] [cash|card|transfer]     amount defaults to the total
  sales                                      every sale
  receipt <sale-id>                          reprint a receipt
  report                                     ledger split by shift
Shift
  open <float>                               open the drawer
  shift [shift-id]                           current drawer, or one shift's report
  preview <counted>                          reconcile without closing
  close <counted> [note...]                  close and reconcile
  history                                    closed shifts
Session
  login <username>
  logout
  whoami
  help
  quit";

/// What a console line produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Json(serde_json::Value),
    Text(String),
    Empty,
    Quit,
}

/// Every state the console dispatches to.
#[derive(Debug, Clone)]
pub struct Terminal {
    pub engine: EngineState,
    pub db: DbState,
    pub session: SessionState,
    pub config: ConfigState,
}

impl Terminal {
    pub fn new(
        engine: EngineState,
        db: DbState,
        session: SessionState,
        config: ConfigState,
    ) -> Self {
        Terminal {
            engine,
            db,
            session,
            config,
        }
    }

    /// Runs one console line.
    pub fn execute(&self, line: &str) -> Result<Reply, ApiError> {
        let tokens = tokenize(line)?;
        let Some((command, args)) = tokens.split_first() else {
            return Ok(Reply::Empty);
        };
        debug!(command = %command, args = args.len(), "Console line");

        match command.as_str() {
            "help" | "?" => Ok(Reply::Text(HELP.to_string())),
            "quit" | "exit" => Ok(Reply::Quit),

            // Catalog
            "products" => json(&product::list_products(&self.engine, &self.config)),
            "add-product" => {
                let [name, price, stock, category] = args else {
                    return Err(usage("add-product <name> <price> <stock> <category>"));
                };
                json(&product::create_product(
                    &self.engine,
                    &self.db,
                    product::CreateProductRequest {
                        name: name.clone(),
                        price: parse_number(price, "price")?,
                        stock: parse_number(stock, "stock")?,
                        category: category.clone(),
                    },
                )?)
            }
            "edit-product" => {
                let Some((target, fields)) = args.split_first() else {
                    return Err(usage("edit-product <product> field=value..."));
                };
                let id = self.product_id(target)?;
                let request = parse_product_edit(fields)?;
                json(&product::update_product(&self.engine, &self.db, &id, request)?)
            }
            "remove-product" => {
                let id = self.product_id(one_arg(args, "remove-product <product>")?)?;
                json(&product::delete_product(&self.engine, &self.db, &id)?)
            }
            "alerts" => json(&product::get_stock_alerts(&self.engine, &self.config)),

            // Cart
            "cart" => json(&cart::get_cart(&self.engine, &self.config)),
            "add" => {
                let (target, qty) = match args {
                    [target] => (target, None),
                    [target, qty] => (target, Some(parse_number(qty, "quantity")?)),
                    _ => return Err(usage("add <product> [qty]")),
                };
                let id = self.product_id(target)?;
                json(&cart::add_to_cart(&self.engine, &self.config, &id, qty)?)
            }
            "qty" => {
                let [target, qty] = args else {
                    return Err(usage("qty <product> <qty>"));
                };
                let id = self.product_id(target)?;
                let qty = parse_number(qty, "quantity")?;
                json(&cart::update_cart_item(&self.engine, &self.config, &id, qty)?)
            }
            "remove" => {
                let id = self.product_id(one_arg(args, "remove <product>")?)?;
                json(&cart::remove_from_cart(&self.engine, &self.config, &id)?)
            }
            "clear" => json(&cart::clear_cart(&self.engine, &self.config)),

            // Sales
            "checkout" => {
                let request = parse_checkout(args)?;
                json(&sale::checkout(
                    &self.engine,
                    &self.db,
                    &self.session,
                    &self.config,
                    request,
                )?)
            }
            "sales" => json(&sale::list_sales(&self.engine, &self.config)),
            "receipt" => {
                let sale_id = one_arg(args, "receipt <sale-id>")?;
                json(&sale::get_receipt(&self.engine, &self.config, sale_id)?)
            }
            "report" => json(&sale::ledger_report(&self.engine)),

            // Shift
            "open" => {
                let float = parse_number(one_arg(args, "open <float>")?, "opening float")?;
                json(&shift::open_shift(&self.engine, &self.db, &self.session, float)?)
            }
            "shift" => match args {
                [] => json(&shift::current_shift(&self.engine, &self.config)),
                [shift_id] => json(&shift::shift_report(&self.engine, shift_id)?),
                _ => Err(usage("shift [shift-id]")),
            },
            "preview" => {
                let counted = parse_number(one_arg(args, "preview <counted>")?, "counted cash")?;
                json(&shift::preview_close(&self.engine, counted)?)
            }
            "close" => {
                let Some((counted, note)) = args.split_first() else {
                    return Err(usage("close <counted> [note...]"));
                };
                let counted = parse_number(counted, "counted cash")?;
                let note = (!note.is_empty()).then(|| note.join(" "));
                json(&shift::close_shift(
                    &self.engine,
                    &self.db,
                    &self.session,
                    &self.config,
                    counted,
                    note,
                )?)
            }
            "history" => json(&shift::shift_history(&self.engine)),

            // Session
            "login" => {
                let username = one_arg(args, "login <username>")?;
                json(&session::login(&self.session, &self.db, &self.config, username)?)
            }
            "logout" => match session::logout(&self.session, &self.db) {
                Some(actor) => Ok(Reply::Text(format!("Signed out {}", actor.username))),
                None => Ok(Reply::Text("Nobody is signed in".to_string())),
            },
            "whoami" => json(&session::whoami(&self.session)),

            other => Err(ApiError::bad_input(format!(
                "Unknown command '{}'; type help",
                other
            ))),
        }
    }

    fn product_id(&self, query: &str) -> Result<String, ApiError> {
        Ok(product::find_product(&self.engine, query)?.id)
    }

    fn prompt(&self) -> String {
        match self.session.current_actor() {
            Some(actor) => format!("{}> ", actor.username),
            None => "till> ".to_string(),
        }
    }
}

/// Reads stdin until EOF or `quit`, then waits for pending writes.
pub async fn run_console(terminal: &Terminal) -> Result<(), ApiError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut out = tokio::io::stdout();

    out.write_all(format!("{} · type help\n", terminal.config.store_name).as_bytes())
        .await?;

    loop {
        out.write_all(terminal.prompt().as_bytes()).await?;
        out.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let text = match terminal.execute(&line) {
            Ok(Reply::Quit) => break,
            Ok(Reply::Empty) => continue,
            Ok(Reply::Text(text)) => text,
            Ok(Reply::Json(value)) => serde_json::to_string_pretty(&value)
                .map_err(|e| ApiError::internal(e.to_string()))?,
            Err(err) => err.to_string(),
        };
        out.write_all(text.as_bytes()).await?;
        out.write_all(b"\n").await?;
    }

    terminal.db.flush().await;
    Ok(())
}

// =============================================================================
// Parsing
// =============================================================================

/// Splits a line on whitespace, keeping "double quoted" runs together.
pub fn tokenize(line: &str) -> Result<Vec<String>, ApiError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err(ApiError::bad_input("Unterminated quote"));
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}

fn json<T: Serialize>(value: &T) -> Result<Reply, ApiError> {
    serde_json::to_value(value)
        .map(Reply::Json)
        .map_err(|e| ApiError::internal(e.to_string()))
}

fn usage(syntax: &str) -> ApiError {
    ApiError::bad_input(format!("Usage: {}", syntax))
}

fn one_arg<'a>(args: &'a [String], syntax: &str) -> Result<&'a str, ApiError> {
    match args {
        [arg] => Ok(arg),
        _ => Err(usage(syntax)),
    }
}

fn parse_number(raw: &str, field: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::bad_input(format!("{} must be a whole number, got '{}'", field, raw)))
}

fn parse_checkout(args: &[String]) -> Result<sale::CheckoutRequest, ApiError> {
    let mut request = sale::CheckoutRequest::default();
    match args {
        [] => {}
        [amount] => request.amount = Some(parse_number(amount, "amount")?),
        [amount, method] => {
            request.amount = Some(parse_number(amount, "amount")?);
            request.method = method.parse::<PaymentMethod>().map_err(|e| ApiError::bad_input(e.to_string()))?;
        }
        _ => return Err(usage("checkout [amount] [cash|card|transfer]")),
    }
    Ok(request)
}

fn parse_product_edit(fields: &[String]) -> Result<product::UpdateProductRequest, ApiError> {
    if fields.is_empty() {
        return Err(usage("edit-product <product> field=value..."));
    }

    let mut request = product::UpdateProductRequest::default();
    for field in fields {
        let Some((key, value)) = field.split_once('=') else {
            return Err(ApiError::bad_input(format!("Expected field=value, got '{}'", field)));
        };
        match key {
            "name" => request.name = Some(value.to_string()),
            "category" => request.category = Some(value.to_string()),
            "price" => request.price = Some(parse_number(value, "price")?),
            "stock" => request.stock = Some(parse_number(value, "stock")?),
            other => {
                return Err(ApiError::bad_input(format!("Unknown product field '{}'", other)));
            }
        }
    }
    Ok(request)
}

// =============================================================================
// Unit Tests
// =============================================================================
