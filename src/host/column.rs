//! Column storage for element tables.

use tracing::trace;

use crate::util::{Bool, Components, ComponentsMut, ComponentVec, DataType, Error, Result};

/// How a column treats writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Access {
    #[default]
    ReadWrite,
    /// Writes are accepted and silently dropped.
    ReadOnly,
    /// Values are stored with 8-bit precision per component (byte colors).
    Quantized,
}

/// One field of every element in a table.
#[derive(Clone, Debug)]
pub struct FieldColumn {
    data_type: DataType,
    access: Access,
    values: ComponentVec,
}

impl FieldColumn {
    /// Zero-initialized column for `len` elements.
    pub fn new(data_type: DataType, access: Access, len: usize) -> Result<Self> {
        let values = ComponentVec::zeroed(data_type.storage(), len * extent(data_type))
            .ok_or_else(|| Error::other(format!("cannot store {data_type} values")))?;
        Ok(Self {
            data_type,
            access,
            values,
        })
    }

    /// Column holding `values`, which must match the storage type of `data_type`.
    pub fn from_values(data_type: DataType, access: Access, values: ComponentVec) -> Result<Self> {
        if values.pod() != data_type.storage() {
            return Err(Error::type_mismatch(data_type.storage(), values.pod()));
        }
        if values.len() % extent(data_type) != 0 {
            return Err(Error::ShapeMismatch(format!(
                "{} components do not divide into {data_type} elements",
                values.len()
            )));
        }
        Ok(Self {
            data_type,
            access,
            values,
        })
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn values(&self) -> &ComponentVec {
        &self.values
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.values.len() / extent(self.data_type)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bulk copy into `dst`, converting component types.
    pub fn read(&self, dst: ComponentsMut<'_>) -> Result<()> {
        self.values.as_components().copy_into(dst)
    }

    /// Bulk copy from `src`, honoring the column's access mode.
    pub fn write(&mut self, src: Components<'_>) -> Result<()> {
        match self.access {
            Access::ReadOnly => {
                if src.len() != self.values.len() {
                    return Err(Error::ShapeMismatch(format!(
                        "transfer of {} components into a column of {}",
                        src.len(),
                        self.values.len()
                    )));
                }
                trace!("ignoring write to read-only column");
                Ok(())
            }
            Access::ReadWrite => src.copy_into(self.values.as_components_mut()),
            Access::Quantized => {
                src.copy_into(self.values.as_components_mut())?;
                if let ComponentVec::Float(v) = &mut self.values {
                    v.iter_mut().for_each(|c| *c = quantize(*c));
                }
                Ok(())
            }
        }
    }

    pub(crate) fn values_mut(&mut self) -> &mut ComponentVec {
        &mut self.values
    }

    /// Grow or shrink to `len` elements; new elements are zero.
    pub(crate) fn resize(&mut self, len: usize) {
        let n = len * extent(self.data_type);
        match &mut self.values {
            ComponentVec::Bool(v) => v.resize(n, Bool::FALSE),
            ComponentVec::Int(v) => v.resize(n, 0),
            ComponentVec::Float(v) => v.resize(n, 0.0),
        }
    }
}

fn extent(data_type: DataType) -> usize {
    data_type.components().max(1)
}

fn quantize(c: f32) -> f32 {
    (c.clamp(0.0, 1.0) * 255.0).round() / 255.0
}

// ============================================================================
// Element tables
// ============================================================================

/// A collection of elements sharing one set of fields.
#[derive(Clone, Debug, Default)]
pub struct ElementTable {
    len: usize,
    columns: Vec<(String, FieldColumn)>,
}

impl ElementTable {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            columns: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Add a zeroed column; replaces an existing column of the same name.
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        data_type: DataType,
        access: Access,
    ) -> Result<&mut FieldColumn> {
        let column = FieldColumn::new(data_type, access, self.len)?;
        self.insert(name.into(), column)
    }

    /// Add a column with initial values for every element.
    pub fn add_values(
        &mut self,
        name: impl Into<String>,
        data_type: DataType,
        access: Access,
        values: ComponentVec,
    ) -> Result<&mut FieldColumn> {
        let column = FieldColumn::from_values(data_type, access, values)?;
        if column.len() != self.len {
            return Err(Error::ShapeMismatch(format!(
                "column has {} elements, table has {}",
                column.len(),
                self.len
            )));
        }
        self.insert(name.into(), column)
    }

    fn insert(&mut self, name: String, column: FieldColumn) -> Result<&mut FieldColumn> {
        let index = match self.columns.iter().position(|(n, _)| *n == name) {
            Some(i) => {
                self.columns[i].1 = column;
                i
            }
            None => {
                self.columns.push((name, column));
                self.columns.len() - 1
            }
        };
        Ok(&mut self.columns[index].1)
    }

    pub fn column(&self, name: &str) -> Option<&FieldColumn> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut FieldColumn> {
        self.columns.iter_mut().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    /// Column names in creation order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Change the element count of every column.
    pub fn resize(&mut self, len: usize) {
        self.len = len;
        for (_, column) in &mut self.columns {
            column.resize(len);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_column_drops_writes() {
        let mut c = FieldColumn::from_values(
            DataType::FLOAT32,
            Access::ReadOnly,
            ComponentVec::Float(vec![4.0, 4.0]),
        )
        .unwrap();
        c.write(Components::Float(&[3.0, 3.0])).unwrap();
        assert_eq!(c.values().as_slice::<f32>().unwrap(), &[4.0, 4.0]);
        assert!(c.write(Components::Float(&[3.0])).is_err());
    }

    #[test]
    fn test_quantized_column() {
        let mut c = FieldColumn::new(DataType::COLOR4F, Access::Quantized, 1).unwrap();
        c.write(Components::Float(&[0.5, 1.5, -0.2, 1.0 / 3.0])).unwrap();
        let v = c.values().as_slice::<f32>().unwrap();
        assert_eq!(v[0], 128.0 / 255.0);
        assert_eq!(v[1], 1.0);
        assert_eq!(v[2], 0.0);
        assert!((v[3] - 1.0 / 3.0).abs() < 0.5 / 255.0);
    }

    #[test]
    fn test_table_resize() {
        let mut t = ElementTable::new(2);
        t.add_values(
            "co",
            DataType::VEC3F,
            Access::ReadWrite,
            ComponentVec::Float(vec![1.0; 6]),
        )
        .unwrap();
        t.add_column("hide", DataType::BOOL, Access::ReadWrite).unwrap();
        t.resize(3);
        assert_eq!(t.len(), 3);
        let co = t.column("co").unwrap();
        assert_eq!(co.len(), 3);
        assert_eq!(&co.values().as_slice::<f32>().unwrap()[6..], &[0.0; 3]);
        assert_eq!(t.column("hide").unwrap().len(), 3);
        assert_eq!(t.column_names().collect::<Vec<_>>(), vec!["co", "hide"]);
    }

    #[test]
    fn test_table_rejects_wrong_length() {
        let mut t = ElementTable::new(2);
        let r = t.add_values(
            "co",
            DataType::VEC3F,
            Access::ReadWrite,
            ComponentVec::Float(vec![0.0; 3]),
        );
        assert!(matches!(r, Err(Error::ShapeMismatch(_))));
    }
}
