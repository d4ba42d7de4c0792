//! Operator boilerplate for newtypes wrapping a single arithmetic field.
//!
//! The relevant `std::ops` traits must be in scope wherever the macro is invoked.

#[macro_export]
macro_rules! op {
    (binary $t:ty, $trait:ident, $fn:ident) => {
        impl $trait for $t {
            type Output = Self;

            fn $fn(self, rhs: Self) -> Self::Output {
                Self(self.0.$fn(rhs.0))
            }
        }
    };
    (inplace $t:ty, $trait:ident, $fn:ident) => {
        impl $trait for $t {
            fn $fn(&mut self, rhs: Self) {
                self.0.$fn(rhs.0)
            }
        }
    };
    (unary $t:ty, $trait:ident, $fn:ident) => {
        impl $trait for $t {
            type Output = Self;

            fn $fn(self) -> Self::Output {
                Self(self.0.$fn())
            }
        }
    };
}
