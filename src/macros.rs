#[macro_export]
macro_rules! value {
    // Handle null
    (null) => {
        $crate::Value::Null
    };

    // Handle true
    (true) => {
        $crate::Value::Bool(true)
    };

    // Handle false
    (false) => {
        $crate::Value::Bool(false)
    };

    // Handle empty list
    ([]) => {
        $crate::Value::Array($crate::ValueMap::new())
    };

    // Handle non-empty list
    ([ $($elem:tt),* $(,)? ]) => {{
        let mut list = $crate::ValueMap::new();
        $(
            list.push($crate::value!($elem));
        )*
        $crate::Value::Array(list)
    }};

    // Handle empty map
    ({}) => {
        $crate::Value::Array($crate::ValueMap::new())
    };

    // Handle non-empty map
    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut map = $crate::ValueMap::new();
        $(
            map.insert($crate::Key::from($key), $crate::value!($value));
        )*
        $crate::Value::Array(map)
    }};

    // Any other expression goes through `From`
    ($e:expr) => {
        $crate::Value::from($e)
    };
}
