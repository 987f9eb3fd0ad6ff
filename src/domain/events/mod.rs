//! Domain events
use crate::domain::aggregates::{OrderId, Role, UserId};
use crate::domain::value_objects::Money;

#[derive(Clone, Debug)]
pub enum DomainEvent {
    User(UserEvent),
    Order(OrderEvent),
}

#[derive(Clone, Debug)]
pub enum UserEvent {
    Registered { user_id: UserId, username: String, role: Role },
}

#[derive(Clone, Debug)]
pub enum OrderEvent {
    Placed { order_id: OrderId, user_id: UserId, username: String, total: Money, line_count: usize },
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::User(UserEvent::Registered { .. }) => "user.registered",
            Self::Order(OrderEvent::Placed { .. }) => "order.placed",
        }
    }
}
