//! Composite method masks for handler registration.

use std::fmt;
use std::ops::BitOr;

use http::Method;

/// A set of HTTP methods a handler accepts.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodSet(u16);

impl MethodSet {
    pub const NONE: MethodSet = MethodSet(0);
    pub const GET: MethodSet = MethodSet(1 << 0);
    pub const POST: MethodSet = MethodSet(1 << 1);
    pub const DELETE: MethodSet = MethodSet(1 << 2);
    pub const PUT: MethodSet = MethodSet(1 << 3);
    pub const PATCH: MethodSet = MethodSet(1 << 4);
    pub const HEAD: MethodSet = MethodSet(1 << 5);
    pub const OPTIONS: MethodSet = MethodSet(1 << 6);
    pub const ANY: MethodSet = MethodSet(0x7f);

    fn bit(method: &Method) -> u16 {
        const TABLE: [(Method, MethodSet); 7] = [
            (Method::GET, MethodSet::GET),
            (Method::POST, MethodSet::POST),
            (Method::DELETE, MethodSet::DELETE),
            (Method::PUT, MethodSet::PUT),
            (Method::PATCH, MethodSet::PATCH),
            (Method::HEAD, MethodSet::HEAD),
            (Method::OPTIONS, MethodSet::OPTIONS),
        ];
        TABLE
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, set)| set.0)
            .unwrap_or(0)
    }

    /// Returns true if `method` is part of this set.
    pub fn contains(&self, method: &Method) -> bool {
        self.0 & Self::bit(method) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl BitOr for MethodSet {
    type Output = MethodSet;

    fn bitor(self, rhs: Self) -> Self::Output {
        MethodSet(self.0 | rhs.0)
    }
}

impl From<Method> for MethodSet {
    fn from(method: Method) -> Self {
        MethodSet(Self::bit(&method))
    }
}

impl Default for MethodSet {
    fn default() -> Self {
        Self::ANY
    }
}

impl fmt::Debug for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(MethodSet, &str); 7] = [
            (MethodSet::GET, "GET"),
            (MethodSet::POST, "POST"),
            (MethodSet::DELETE, "DELETE"),
            (MethodSet::PUT, "PUT"),
            (MethodSet::PATCH, "PATCH"),
            (MethodSet::HEAD, "HEAD"),
            (MethodSet::OPTIONS, "OPTIONS"),
        ];
        let mut list = f.debug_set();
        for (set, name) in NAMES {
            if self.0 & set.0 != 0 {
                list.entry(&name);
            }
        }
        list.finish()
    }
}
