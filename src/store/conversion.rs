//! Arrow record batch to [`ResultTable`] conversion.

use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Float32Array, Float64Array, Int16Array,
    Int32Array, Int64Array, Int8Array, LargeStringArray, StringArray, TimestampMicrosecondArray,
    TimestampMillisecondArray, TimestampNanosecondArray, TimestampSecondArray, UInt16Array,
    UInt32Array, UInt64Array, UInt8Array,
};
use arrow::datatypes::{DataType as ArrowDataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use chrono::{DateTime, NaiveDate, Utc};

use crate::table::{Column, DataType, ResultTable, Row, Schema, Value};

use super::error::{Result, StoreError};

pub fn batches_to_table(batches: &[RecordBatch]) -> Result<ResultTable> {
    let arrow_schema = batches
        .first()
        .map(|b| b.schema())
        .ok_or_else(|| StoreError::Conversion("no record batches to convert".to_string()))?;

    let schema = convert_schema(&arrow_schema);
    let mut rows = Vec::new();

    for batch in batches {
        for row_idx in 0..batch.num_rows() {
            let values = batch
                .columns()
                .iter()
                .map(|array| convert_array_value(array, row_idx))
                .collect::<Result<Vec<Value>>>()?;
            rows.push(Row::new(values));
        }
    }

    Ok(ResultTable::with_rows(schema, rows))
}

pub fn convert_schema(arrow_schema: &arrow::datatypes::Schema) -> Schema {
    let columns = arrow_schema
        .fields()
        .iter()
        .map(|field| Column::new(field.name().clone(), convert_data_type(field.data_type())))
        .collect();

    Schema::new(columns)
}

fn convert_data_type(arrow_type: &ArrowDataType) -> DataType {
    match arrow_type {
        ArrowDataType::Int8
        | ArrowDataType::Int16
        | ArrowDataType::Int32
        | ArrowDataType::Int64
        | ArrowDataType::UInt8
        | ArrowDataType::UInt16
        | ArrowDataType::UInt32
        | ArrowDataType::UInt64 => DataType::Integer,
        ArrowDataType::Float32 | ArrowDataType::Float64 => DataType::Float,
        ArrowDataType::Boolean => DataType::Boolean,
        ArrowDataType::Null => DataType::Null,
        // Dates, timestamps and anything exotic render as strings
        _ => DataType::String,
    }
}

fn convert_array_value(array: &ArrayRef, index: usize) -> Result<Value> {
    if array.is_null(index) {
        return Ok(Value::Null);
    }

    macro_rules! int_value {
        ($ty:ty) => {{
            let arr = array.as_any().downcast_ref::<$ty>().unwrap();
            Value::Integer(arr.value(index) as i64)
        }};
    }

    let value = match array.data_type() {
        ArrowDataType::Int8 => int_value!(Int8Array),
        ArrowDataType::Int16 => int_value!(Int16Array),
        ArrowDataType::Int32 => int_value!(Int32Array),
        ArrowDataType::Int64 => int_value!(Int64Array),
        ArrowDataType::UInt8 => int_value!(UInt8Array),
        ArrowDataType::UInt16 => int_value!(UInt16Array),
        ArrowDataType::UInt32 => int_value!(UInt32Array),
        ArrowDataType::UInt64 => int_value!(UInt64Array),
        ArrowDataType::Float32 => {
            let arr = array.as_any().downcast_ref::<Float32Array>().unwrap();
            Value::Float(arr.value(index) as f64)
        }
        ArrowDataType::Float64 => {
            let arr = array.as_any().downcast_ref::<Float64Array>().unwrap();
            Value::Float(arr.value(index))
        }
        ArrowDataType::Boolean => {
            let arr = array.as_any().downcast_ref::<BooleanArray>().unwrap();
            Value::Boolean(arr.value(index))
        }
        ArrowDataType::Utf8 => {
            let arr = array.as_any().downcast_ref::<StringArray>().unwrap();
            Value::String(arr.value(index).to_string())
        }
        ArrowDataType::LargeUtf8 => {
            let arr = array.as_any().downcast_ref::<LargeStringArray>().unwrap();
            Value::String(arr.value(index).to_string())
        }
        ArrowDataType::Date32 => {
            let arr = array.as_any().downcast_ref::<Date32Array>().unwrap();
            let days = arr.value(index);
            let date = NaiveDate::from_ymd_opt(1970, 1, 1)
                .unwrap()
                .checked_add_signed(chrono::Duration::days(days as i64))
                .ok_or_else(|| {
                    StoreError::Conversion(format!("date out of range: {} days", days))
                })?;
            Value::String(date.format("%Y-%m-%d").to_string())
        }
        ArrowDataType::Timestamp(unit, _) => Value::String(format_timestamp(array, index, unit)?),
        ArrowDataType::Null => Value::Null,
        // Anything else goes through Arrow's own display formatting
        _ => Value::String(array_value_to_string(array, index)?),
    };

    Ok(value)
}

fn format_timestamp(array: &ArrayRef, index: usize, unit: &TimeUnit) -> Result<String> {
    let out_of_range = || StoreError::Conversion("timestamp out of range".to_string());

    let formatted = match unit {
        TimeUnit::Second => {
            let arr = array
                .as_any()
                .downcast_ref::<TimestampSecondArray>()
                .unwrap();
            DateTime::<Utc>::from_timestamp(arr.value(index), 0)
                .ok_or_else(out_of_range)?
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        }
        TimeUnit::Millisecond => {
            let arr = array
                .as_any()
                .downcast_ref::<TimestampMillisecondArray>()
                .unwrap();
            DateTime::<Utc>::from_timestamp_millis(arr.value(index))
                .ok_or_else(out_of_range)?
                .format("%Y-%m-%d %H:%M:%S%.3f")
                .to_string()
        }
        TimeUnit::Microsecond => {
            let arr = array
                .as_any()
                .downcast_ref::<TimestampMicrosecondArray>()
                .unwrap();
            DateTime::<Utc>::from_timestamp_micros(arr.value(index))
                .ok_or_else(out_of_range)?
                .format("%Y-%m-%d %H:%M:%S%.6f")
                .to_string()
        }
        TimeUnit::Nanosecond => {
            let arr = array
                .as_any()
                .downcast_ref::<TimestampNanosecondArray>()
                .unwrap();
            DateTime::<Utc>::from_timestamp_nanos(arr.value(index))
                .format("%Y-%m-%d %H:%M:%S%.9f")
                .to_string()
        }
    };

    Ok(formatted)
}
