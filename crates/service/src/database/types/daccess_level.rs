use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::sqlite::{SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef};
use sqlx::{Decode, Encode, Sqlite, Type};

use common::prelude::AccessLevel;

/// [`AccessLevel`] stored as its wire name (`PRIVATE`, `ORGANIZATION`, `SHARED`)
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DAccessLevel(AccessLevel);

impl From<DAccessLevel> for AccessLevel {
    fn from(val: DAccessLevel) -> Self {
        val.0
    }
}

impl From<AccessLevel> for DAccessLevel {
    fn from(level: AccessLevel) -> Self {
        Self(level)
    }
}

impl Decode<'_, Sqlite> for DAccessLevel {
    fn decode(value: SqliteValueRef<'_>) -> Result<Self, BoxDynError> {
        let s = <String as Decode<Sqlite>>::decode(value)?;
        Ok(Self(s.parse::<AccessLevel>()?))
    }
}

impl Encode<'_, Sqlite> for DAccessLevel {
    fn encode_by_ref(
        &self,
        args: &mut Vec<SqliteArgumentValue<'_>>,
    ) -> Result<IsNull, BoxDynError> {
        args.push(SqliteArgumentValue::Text(self.0.as_str().into()));
        Ok(IsNull::No)
    }
}

impl Type<Sqlite> for DAccessLevel {
    fn compatible(ty: &SqliteTypeInfo) -> bool {
        <String as Type<Sqlite>>::compatible(ty)
    }

    fn type_info() -> SqliteTypeInfo {
        <String as Type<Sqlite>>::type_info()
    }
}
