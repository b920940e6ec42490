//! HTTP method bitmask used to filter middleware nodes.
//!
//! ```
//! use http::Method;
//! use weft_web::MethodMask;
//!
//! let mask = MethodMask::GET | MethodMask::HEAD;
//! assert!(mask.contains(&Method::HEAD));
//! assert!(!mask.contains(&Method::POST));
//! assert!(MethodMask::ALL.contains(&Method::OPTIONS));
//! ```

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use http::Method;

/// A set of HTTP methods a node answers to.
///
/// [`MethodMask::ALL`] matches every method, including ones without a dedicated bit.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodMask(u8);

const ALL_BIT: u8 = 1 << 7;

macro_rules! method_mask {
    ($($name:ident = $bit:expr;)*) => {
        impl MethodMask {
            $(
                #[doc = concat!("Matches HTTP ", stringify!($name), " requests.")]
                pub const $name: MethodMask = MethodMask(1 << $bit);
            )*

            /// The bit for a method, empty for methods without a dedicated bit.
            pub fn for_method(method: &Method) -> MethodMask {
                $(
                    if *method == Method::$name {
                        return MethodMask::$name;
                    }
                )*
                MethodMask::EMPTY
            }

            const NAMED: &'static [(&'static str, MethodMask)] = &[$((stringify!($name), MethodMask::$name)),*];
        }
    };
}

method_mask! {
    GET = 0;
    POST = 1;
    PUT = 2;
    DELETE = 3;
    HEAD = 4;
}

impl MethodMask {
    /// Matches no method.
    pub const EMPTY: MethodMask = MethodMask(0);

    /// Matches every method.
    pub const ALL: MethodMask = MethodMask(ALL_BIT | 0b1_1111);

    #[inline]
    pub fn is_all(self) -> bool {
        self.0 & ALL_BIT != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether a request with `method` passes this mask.
    pub fn contains(self, method: &Method) -> bool {
        if self.is_all() {
            return true;
        }
        let bit = MethodMask::for_method(method);
        !bit.is_empty() && self.0 & bit.0 == bit.0
    }
}

impl BitOr for MethodMask {
    type Output = MethodMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        MethodMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for MethodMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<&Method> for MethodMask {
    fn from(method: &Method) -> Self {
        MethodMask::for_method(method)
    }
}

impl fmt::Debug for MethodMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all() {
            return f.write_str("ALL");
        }
        let names: Vec<_> =
            MethodMask::NAMED.iter().filter(|(_, bit)| self.0 & bit.0 != 0).map(|(name, _)| *name).collect();
        write!(f, "{}", names.join("|"))
    }
}
