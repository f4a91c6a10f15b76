// Python bindings
use pyo3::exceptions::PyIOError;
use pyo3::prelude::*;

use crate::error::Error;
use crate::file::WavPackFile;
use crate::stream::FileStream;
use crate::tag::PropertyMap;
use crate::tag_union::TagTypes;

#[pymodule]
fn wvtags(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyWavPackFile>()?;
    m.add("STRIP_ID3V1", TagTypes::ID3V1.bits())?;
    m.add("STRIP_APE", TagTypes::APE.bits())?;
    m.add("STRIP_ALL", TagTypes::ALL.bits())?;
    Ok(())
}

fn to_py_err(e: Error) -> PyErr {
    PyIOError::new_err(e.to_string())
}

/// WavPack file with APE and ID3v1 tags
#[pyclass(name = "WavPackFile")]
pub struct PyWavPackFile {
    #[pyo3(get)]
    path: String,
    inner: WavPackFile<FileStream>,
}

#[pymethods]
impl PyWavPackFile {
    #[new]
    #[pyo3(signature = (path, read_properties = true))]
    fn new(path: String, read_properties: bool) -> PyResult<Self> {
        let inner = WavPackFile::open_path(&path, read_properties).map_err(to_py_err)?;
        Ok(PyWavPackFile { path, inner })
    }

    /// Unified properties of all tags
    fn properties(&self) -> PropertyMap {
        self.inner.properties()
    }

    /// Replace the tag contents; returns the entries that could not be stored
    fn set_properties(&mut self, properties: PropertyMap) -> PropertyMap {
        self.inner.set_properties(&properties)
    }

    /// Remove tags (STRIP_ID3V1, STRIP_APE or STRIP_ALL); applied on save()
    fn strip(&mut self, mask: u8) {
        self.inner.strip(TagTypes::from_bits(mask));
    }

    fn save(&mut self) -> PyResult<bool> {
        self.inner.save().map_err(to_py_err)
    }

    #[getter]
    fn has_id3v1_tag(&self) -> bool {
        self.inner.has_id3v1_tag()
    }

    #[getter]
    fn has_ape_tag(&self) -> bool {
        self.inner.has_ape_tag()
    }

    /// Audio properties as a JSON string, or None if they could not be read
    fn audio_properties(&self) -> PyResult<Option<String>> {
        self.inner
            .audio_properties()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| PyIOError::new_err(e.to_string()))
    }

    fn __repr__(&self) -> String {
        format!(
            "WavPackFile(path={}, ape={}, id3v1={})",
            self.path,
            self.inner.has_ape_tag(),
            self.inner.has_id3v1_tag()
        )
    }
}
