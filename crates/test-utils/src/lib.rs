//! Test utilities shared between the crates of the workspace.

/// A result type useful in tests, that wraps any error implementation.
pub type Result<T = ()> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Shortcut for `<string>.parse().unwrap()`.
#[macro_export]
macro_rules! parse {
    ($string:literal) => {
        $string.parse().unwrap()
    };
}

/// Macro for creating parametrized tests.
///
/// The `param_test!` macro accepts the name of an existing function, followed by a list of case
/// names and their arguments. It expands to a module with a `#[test]` function for each of the
/// cases. Each test case calls the existing, named function with their provided arguments.
///
/// # Examples
///
/// Calling a simple test function can be done as follows
///
/// ```
/// # use test_utils::param_test;
/// #
/// param_test! {
///     header_words: [
///         ipv4: (20, 5),
///         tcp_with_timestamps: (32, 8)
///     ]
/// }
/// fn header_words(bytes: usize, words: usize) {
///     assert_eq!(bytes / 4, words);
/// }
/// ```
///
/// Additionally, test functions can also have return types, such as a [`Result`]:
///
/// ```
/// # use std::{error::Error, net::Ipv4Addr};
/// # use test_utils::param_test;
/// #
/// param_test! {
///     parses_addresses -> Result<(), Box<dyn Error>>: [
///         private: ("192.168.1.96", [192, 168, 1, 96]),
///         broadcast: ("255.255.255.255", [255; 4])
///     ]
/// }
/// fn parses_addresses(to_parse: &str, octets: [u8; 4]) -> Result<(), Box<dyn Error>> {
///     assert_eq!(to_parse.parse::<Ipv4Addr>()?.octets(), octets);
///     Ok(())
/// }
/// ```
///
/// Finally, attributes such as as `#[ignore]` may be added to individual tests:
///
/// ```
/// # use std::{error::Error, net::Ipv4Addr};
/// # use test_utils::param_test;
/// #
/// param_test! {
///     parses_addresses -> Result<(), Box<dyn Error>>: [
///         #[ignore] private: ("192.168.1.96", [192, 168, 1, 96]),
///         loopback: ("127.0.0.1", [127, 0, 0, 1])
///     ]
/// }
/// fn parses_addresses(to_parse: &str, octets: [u8; 4]) -> Result<(), Box<dyn Error>> {
///     assert_eq!(to_parse.parse::<Ipv4Addr>()?.octets(), octets);
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! param_test {
    ($func_name:ident -> $return_ty:ty: [
        $( $(#[$outer:meta])* $case_name:ident: ( $($args:expr),+ )  ),+$(,)?
    ]) => {
        mod $func_name {
            use super::*;

            $(
                #[test]
                $(#[$outer])*
                fn $case_name() -> $return_ty {
                    $func_name($($args),+)
                }
            )*
        }
    };
    ($func_name:ident: [
        $( $(#[$outer:meta])* $case_name:ident: ( $($args:expr),+ ) ),+$(,)?
    ]) => {
        param_test!($func_name -> (): [ $( $(#[$outer])* $case_name: ( $($args),+ ) ),+ ]);
    };
}

#[cfg(test)]
mod tests {
    use std::{error::Error, net::Ipv4Addr};

    param_test! {
        test_with_no_return: [
            case1: (true, 1, 1),
            case2: (false, 3, 4)
        ]
    }
    fn test_with_no_return(bool_arg: bool, usize_arg: usize, u32_arg: u32) {
        assert_eq!(bool_arg, usize_arg == u32_arg as usize);
    }

    param_test! {
        test_with_return -> Result<(), Box<dyn Error>>: [
            case1: ("5", 5),
            case2: ("7", 7)
        ]
    }
    fn test_with_return(to_parse: &str, parsed: usize) -> Result<(), Box<dyn Error>> {
        assert_eq!(parsed, to_parse.parse()?);
        Ok(())
    }

    #[test]
    fn parse_shortcut() {
        let address: Ipv4Addr = parse!("192.168.1.254");
        assert_eq!(address.octets(), [192, 168, 1, 254]);
    }
}
