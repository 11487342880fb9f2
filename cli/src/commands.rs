//! Subcommand implementations. Results go to stdout as JSON; diagnostics go
//! through `tracing` to stderr.

use std::error::Error;

use clap::Args;
use order_client::{
    Address, ClientConfig, FileStore, OrderClient, PayOrder, PaymentSource, Shipping,
    UreqTransport,
};
use serde_json::{Map, Value};

type CommandResult = Result<(), Box<dyn Error>>;

pub struct Context {
    client: OrderClient<FileStore>,
    transport: UreqTransport,
}

impl Context {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: OrderClient::from_config(config),
            transport: UreqTransport::new(config.timeout),
        }
    }

    /// `explicit` if given, otherwise the persisted active order id.
    fn order_id(&self, explicit: Option<String>) -> Result<String, Box<dyn Error>> {
        match explicit {
            Some(id) => Ok(id),
            None => self
                .client
                .active_order_id()?
                .ok_or_else(|| "no active order; pass --order or create one first".into()),
        }
    }
}

#[derive(Args)]
pub struct CreateArgs {
    /// ISO currency code
    #[arg(long, default_value = "usd")]
    currency: String,

    #[arg(long)]
    email: String,

    /// Recipient name; shipping is omitted without it
    #[arg(long, requires = "line1")]
    name: Option<String>,

    /// First address line; required with `--name`
    #[arg(long, requires = "name")]
    line1: Option<String>,

    #[arg(long)]
    city: Option<String>,

    #[arg(long)]
    postal_code: Option<String>,

    #[arg(long)]
    country: Option<String>,

    /// Line item as `SKU` or `SKU:QTY`; repeatable
    #[arg(long = "item", value_parser = parse_item, required = true)]
    items: Vec<(String, u32)>,

    /// Metadata entry as `KEY=VALUE`; repeatable
    #[arg(long = "meta", value_parser = parse_meta)]
    metadata: Vec<(String, String)>,
}

impl CreateArgs {
    fn shipping(&self) -> Option<Shipping> {
        let name = self.name.clone()?;
        let line1 = self.line1.clone()?;
        Some(Shipping {
            name,
            phone: None,
            address: Address {
                line1,
                line2: None,
                city: self.city.clone(),
                state: None,
                postal_code: self.postal_code.clone(),
                country: self.country.clone(),
            },
        })
    }
}

fn parse_item(raw: &str) -> Result<(String, u32), String> {
    let (sku, quantity) = match raw.split_once(':') {
        Some((sku, qty)) => {
            let qty: u32 = qty.parse().map_err(|e| format!("invalid quantity {qty:?}: {e}"))?;
            (sku, qty)
        }
        None => (raw, 1),
    };
    if sku.is_empty() {
        return Err("sku must not be empty".to_string());
    }
    if quantity == 0 {
        return Err("quantity must be at least 1".to_string());
    }
    Ok((sku.to_string(), quantity))
}

fn parse_meta(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))
}

fn print_json<T: serde::Serialize>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn config(ctx: &Context) -> CommandResult {
    let config = ctx.client.get_config(&ctx.transport)?;
    if !config.is_live_mode() {
        tracing::info!("backend is in demo mode; no real charges are made");
    }
    print_json(&config)
}

pub fn products(mut ctx: Context) -> CommandResult {
    ctx.client.load_products(&ctx.transport)?;
    let mut products: Vec<_> = ctx.client.products().values().collect();
    products.sort_by(|a, b| a.id.cmp(&b.id));

    let mut rows = Vec::with_capacity(products.len());
    for product in products {
        let price = match (product.price, product.currency.as_deref()) {
            (Some(amount), Some(currency)) => Some(ctx.client.format_price(amount, currency)?),
            _ => None,
        };
        rows.push(serde_json::json!({
            "id": product.id,
            "name": product.name,
            "price": price,
        }));
    }
    print_json(&rows)
}

pub fn create(mut ctx: Context, args: CreateArgs) -> CommandResult {
    for (sku, quantity) in &args.items {
        ctx.client.add_line_item(sku.clone(), *quantity);
    }
    let metadata: Map<String, Value> = args
        .metadata
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    let payload = ctx
        .client
        .order_payload(&args.currency, &args.email, args.shipping(), metadata);

    let order = ctx.client.create_order(&ctx.transport, &payload)?;
    print_json(&order)
}

pub fn pay(ctx: &Context, order: Option<String>, source: &str) -> CommandResult {
    let order_id = ctx.order_id(order)?;
    let input = PayOrder {
        source: PaymentSource::from_id(source),
    };
    let payment = ctx.client.pay_order(&ctx.transport, &order_id, &input)?;
    print_json(&payment)
}

pub fn status(ctx: &Context, order: Option<String>) -> CommandResult {
    let order_id = ctx.order_id(order)?;
    let order = ctx.client.get_order_status(&ctx.transport, &order_id)?;
    print_json(&order)
}

pub fn active(ctx: &Context) -> CommandResult {
    match ctx.client.active_order_id()? {
        Some(id) => println!("{id}"),
        None => tracing::info!("no active order"),
    }
    Ok(())
}

pub fn price(ctx: &Context, amount: i64, currency: &str) -> CommandResult {
    println!("{}", ctx.client.format_price(amount, currency)?);
    Ok(())
}
