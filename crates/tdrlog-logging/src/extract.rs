//! Context field extraction
//!
//! Turns the identity slots of a [`RequestContext`] into record fields.
//! Each slot is looked up through an ordered list of strategies (typed key
//! first, then the legacy string key); the first non-empty value wins and
//! a slot with no value is left out entirely.

use tdrlog_core_types::{ContextKey, RequestContext};

use crate::field::Field;

/// One way of finding a slot's value in a context
#[derive(Debug, Clone, Copy)]
enum Lookup {
    Typed(ContextKey),
    Legacy(&'static str),
}

impl Lookup {
    fn find<'a>(&self, ctx: &'a RequestContext) -> Option<&'a str> {
        match self {
            Lookup::Typed(key) => ctx.typed(*key),
            Lookup::Legacy(name) => ctx.legacy(name),
        }
    }
}

struct Slot {
    key: ContextKey,
    lookups: [Lookup; 2],
}

impl Slot {
    const fn new(key: ContextKey, legacy: &'static str) -> Self {
        Self {
            key,
            lookups: [Lookup::Typed(key), Lookup::Legacy(legacy)],
        }
    }

    fn resolve<'a>(&self, ctx: &'a RequestContext) -> Option<&'a str> {
        self.lookups
            .iter()
            .filter_map(|lookup| lookup.find(ctx))
            .find(|v| !v.is_empty())
    }
}

const SLOTS: [Slot; 4] = [
    Slot::new(ContextKey::TraceId, "traceId"),
    Slot::new(ContextKey::SrcIp, "srcIP"),
    Slot::new(ContextKey::Port, "port"),
    Slot::new(ContextKey::Path, "path"),
];

/// Fields for every populated identity slot, in slot order
pub fn context_fields(ctx: &RequestContext) -> Vec<Field> {
    let mut fields = Vec::with_capacity(SLOTS.len());
    for slot in &SLOTS {
        if let Some(value) = slot.resolve(ctx) {
            fields.push(Field::string(slot.key.name(), value));
        }
    }
    fields
}
