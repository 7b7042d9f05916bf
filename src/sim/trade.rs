//! Manual trade flow: a small form state machine plus pure settlement.
//!
//! `Closed` -> `open` -> `Open(form)` -> edits -> `submit` -> `Closed`.
//! Amount and price are kept inside form-level bounds as they are edited.
//! The amount ceiling is fixed when the form opens and the market keeps
//! ticking underneath it. [`settle`] itself applies whatever ticket it is given.

use chrono::{DateTime, Utc};

use super::store::{SimState, Store};
use crate::error::{Result, TradeError};
use crate::market::{
    Agent, AgentId, AgentStatus, MarketState, Transaction, TransactionId, TransactionOrigin,
    TransactionStatus, find_agent,
};

/// Amount pre-filled when the form opens (kWh).
pub const DEFAULT_AMOUNT_KWH: f64 = 100.0;
/// Smallest amount the form accepts (kWh).
pub const MIN_AMOUNT_KWH: f64 = 1.0;
/// Smallest unit price the form accepts.
pub const MIN_PRICE_PER_KWH: f64 = 0.001;

/// Field of the trade form that currently has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Counterparty,
    Amount,
    Price,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            Self::Counterparty => Self::Amount,
            Self::Amount => Self::Price,
            Self::Price => Self::Counterparty,
        }
    }
}

/// A fully specified trade awaiting settlement.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeTicket {
    pub seller_id: AgentId,
    pub buyer_id: AgentId,
    pub amount_kwh: f64,
    pub price_per_kwh: f64,
    /// Always non-negative: `amount x |counterparty - agent|` footprint.
    pub carbon_saved_kg: f64,
}

/// Editable state of an open trade form.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeForm {
    /// The agent whose card opened the form.
    pub target: AgentId,
    pub counterparty: Option<AgentId>,
    pub amount_kwh: f64,
    /// Amount ceiling taken from the target when the form opened (kWh).
    pub max_amount_kwh: f64,
    pub price_per_kwh: f64,
    pub focus: FormField,
}

impl TradeForm {
    /// Moves focus to the next field.
    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn select_counterparty(&mut self, id: AgentId) {
        self.counterparty = Some(id);
    }

    /// Steps the counterparty through the eligible partners, wrapping around.
    ///
    /// With nothing selected, forward picks the first partner and backward the last.
    pub fn cycle_counterparty(&mut self, agents: &[Agent], forward: bool) {
        let Some(target) = find_agent(agents, &self.target) else {
            return;
        };
        let partners = counterparties(agents, target);
        if partners.is_empty() {
            return;
        }
        let n = partners.len();
        let current = self
            .counterparty
            .as_ref()
            .and_then(|id| partners.iter().position(|p| &p.id == id));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => n - 1,
            (Some(i), true) => (i + 1) % n,
            (Some(i), false) => (i + n - 1) % n,
        };
        self.counterparty = Some(partners[next].id.clone());
    }

    /// Sets the amount, held within `[MIN_AMOUNT_KWH, max_amount_kwh]`.
    pub fn set_amount(&mut self, amount_kwh: f64) {
        self.amount_kwh = amount_kwh.min(self.max_amount_kwh).max(MIN_AMOUNT_KWH);
    }

    pub fn adjust_amount(&mut self, delta_kwh: f64) {
        self.set_amount(self.amount_kwh + delta_kwh);
    }

    /// Sets the unit price, floored at [`MIN_PRICE_PER_KWH`].
    pub fn set_price(&mut self, price: f64) {
        self.price_per_kwh = price.max(MIN_PRICE_PER_KWH);
    }

    pub fn adjust_price(&mut self, delta: f64) {
        self.set_price(self.price_per_kwh + delta);
    }

    /// Builds a settlement ticket from the form and the current roster.
    ///
    /// # Errors
    ///
    /// Fails when no partner is selected, an id does not resolve, both
    /// agents trade on the same side, or an input sits outside its bounds.
    pub fn ticket(&self, agents: &[Agent]) -> Result<TradeTicket> {
        let partner_id = self.counterparty.as_ref().ok_or(TradeError::NoCounterparty)?;
        let target = find_agent(agents, &self.target)
            .ok_or_else(|| TradeError::UnknownAgent(self.target.clone()))?;
        let partner = find_agent(agents, partner_id)
            .ok_or_else(|| TradeError::UnknownAgent(partner_id.clone()))?;
        if partner.kind == target.kind || partner.id == target.id {
            return Err(TradeError::SameSide(target.id.clone(), partner.id.clone()));
        }

        if self.amount_kwh < MIN_AMOUNT_KWH || self.amount_kwh > self.max_amount_kwh {
            return Err(TradeError::AmountOutOfRange {
                amount: self.amount_kwh,
                min: MIN_AMOUNT_KWH,
                max: self.max_amount_kwh,
            });
        }
        if self.price_per_kwh < MIN_PRICE_PER_KWH {
            return Err(TradeError::PriceTooLow(self.price_per_kwh, MIN_PRICE_PER_KWH));
        }

        let (seller, buyer) = if target.is_producer() {
            (target, partner)
        } else {
            (partner, target)
        };
        Ok(TradeTicket {
            seller_id: seller.id.clone(),
            buyer_id: buyer.id.clone(),
            amount_kwh: self.amount_kwh,
            price_per_kwh: self.price_per_kwh,
            carbon_saved_kg: self.amount_kwh
                * (partner.carbon_footprint - target.carbon_footprint).abs(),
        })
    }
}

/// Trade modal state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TradeFlow {
    #[default]
    Closed,
    Open(TradeForm),
}

impl TradeFlow {
    /// Opens the form for `target`, pre-filling amount and market price.
    ///
    /// The amount ceiling is read from `target` here and not again.
    pub fn open(&mut self, target: &Agent, market_price: f64) {
        let (_, max_amount_kwh) = amount_bounds(target);
        let mut form = TradeForm {
            target: target.id.clone(),
            counterparty: None,
            amount_kwh: DEFAULT_AMOUNT_KWH,
            max_amount_kwh,
            price_per_kwh: market_price,
            focus: FormField::Counterparty,
        };
        form.set_amount(DEFAULT_AMOUNT_KWH);
        form.set_price(market_price);
        *self = Self::Open(form);
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    pub fn form(&self) -> Option<&TradeForm> {
        match self {
            Self::Open(form) => Some(form),
            Self::Closed => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut TradeForm> {
        match self {
            Self::Open(form) => Some(form),
            Self::Closed => None,
        }
    }

    /// Closes the form without trading.
    pub fn cancel(&mut self) {
        *self = Self::Closed;
    }

    /// Submits the open form, settles it into `store`, and closes the flow.
    ///
    /// # Errors
    ///
    /// On any [`TradeError`] the flow stays open and the store is unchanged.
    pub fn submit(&mut self, store: &mut Store, now: DateTime<Utc>) -> Result<Transaction> {
        let form = self.form().ok_or(TradeError::NotOpen)?;
        let ticket = form.ticket(&store.state().agents)?;
        let tx = store.settle(&ticket, now);
        *self = Self::Closed;
        Ok(tx)
    }
}

/// Agents the target may trade with: the opposite kind, never itself.
pub fn counterparties<'a>(agents: &'a [Agent], target: &Agent) -> Vec<&'a Agent> {
    agents
        .iter()
        .filter(|a| a.id != target.id && a.kind == target.kind.opposite())
        .collect()
}

/// Form bounds for the amount: `[1, available energy]` for a producer,
/// `[1, remaining capacity]` for a consumer.
///
/// The upper bound can fall below the lower one; no amount is then accepted.
pub fn amount_bounds(target: &Agent) -> (f64, f64) {
    let max = if target.is_producer() {
        target.current_energy_kwh
    } else {
        target.remaining_capacity_kwh()
    };
    (MIN_AMOUNT_KWH, max)
}

/// Applies a ticket: moves energy, activates both agents, updates market
/// aggregates, and records a completed transaction.
///
/// Energy is not re-clamped against capacity or zero.
pub fn settle(
    prev: &SimState,
    ticket: &TradeTicket,
    now: DateTime<Utc>,
) -> (SimState, Transaction) {
    let id = TransactionId(prev.next_transaction_id);
    let tx = Transaction {
        id,
        seller_id: ticket.seller_id.clone(),
        buyer_id: ticket.buyer_id.clone(),
        amount_kwh: ticket.amount_kwh,
        price_per_kwh: ticket.price_per_kwh,
        timestamp: now,
        status: TransactionStatus::Completed,
        carbon_saved_kg: ticket.carbon_saved_kg,
        origin: TransactionOrigin::Manual,
    };

    let agents = prev
        .agents
        .iter()
        .map(|a| {
            let delta = if a.id == ticket.seller_id {
                -ticket.amount_kwh
            } else if a.id == ticket.buyer_id {
                ticket.amount_kwh
            } else {
                return a.clone();
            };
            Agent {
                current_energy_kwh: a.current_energy_kwh + delta,
                status: AgentStatus::Active,
                last_transaction: Some(id),
                ..a.clone()
            }
        })
        .collect();

    let market = MarketState {
        total_volume_kwh: prev.market.total_volume_kwh + ticket.amount_kwh,
        current_price: (prev.market.current_price + ticket.price_per_kwh) / 2.0,
        ..prev.market.clone()
    };

    let mut transactions = prev.transactions.clone();
    transactions.record(tx.clone());
    log::info!("settled {tx}");

    let next = SimState {
        agents,
        market,
        transactions,
        next_transaction_id: prev.next_transaction_id + 1,
    };
    (next, tx)
}
