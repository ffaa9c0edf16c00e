//! `tf.train.Example` protos and the per-image feature map.
//!
//! The message definitions mirror `tensorflow/core/example/example.proto`
//! and `feature.proto`, declared directly with prost derives so that no
//! build-time protobuf compilation is needed. Features use a `BTreeMap` so
//! that serialized records are byte-for-byte reproducible.

use std::collections::BTreeMap;

use crate::dataset::ImageRecord;

/// Feature keys written for every image.
pub mod keys {
    pub const HEIGHT: &str = "image/height";
    pub const WIDTH: &str = "image/width";
    pub const COLORSPACE: &str = "image/colorspace";
    pub const CHANNELS: &str = "image/channels";
    pub const CLASS_LABEL: &str = "image/class/label";
    pub const CLASS_TEXT: &str = "image/class/text";
    pub const OBJECT_CLASS_LABEL: &str = "image/object/class/label";
    pub const OBJECT_CLASS_TEXT: &str = "image/object/class/text";
    pub const BBOX_XMIN: &str = "image/object/bbox/xmin";
    pub const BBOX_XMAX: &str = "image/object/bbox/xmax";
    pub const BBOX_YMIN: &str = "image/object/bbox/ymin";
    pub const BBOX_YMAX: &str = "image/object/bbox/ymax";
    pub const FORMAT: &str = "image/format";
    pub const FILENAME: &str = "image/filename";
    pub const SOURCE_ID: &str = "image/source_id";
    pub const ENCODED: &str = "image/encoded";
}

pub const COLORSPACE: &str = "RGB";
pub const CHANNELS: i64 = 3;
pub const IMAGE_FORMAT: &str = "JPEG";

/// Every image holds one object class, the bird itself.
pub const OBJECT_CLASS_LABEL: i64 = 1;
pub const OBJECT_CLASS_TEXT: &str = "bird";

#[derive(Clone, PartialEq, prost::Message)]
pub struct Example {
    #[prost(message, optional, tag = "1")]
    pub features: Option<Features>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Features {
    #[prost(btree_map = "string, message", tag = "1")]
    pub feature: BTreeMap<String, Feature>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Feature {
    #[prost(oneof = "feature::Kind", tags = "1, 2, 3")]
    pub kind: Option<feature::Kind>,
}

pub mod feature {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Kind {
        #[prost(message, tag = "1")]
        BytesList(super::BytesList),
        #[prost(message, tag = "2")]
        FloatList(super::FloatList),
        #[prost(message, tag = "3")]
        Int64List(super::Int64List),
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct BytesList {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub value: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct FloatList {
    #[prost(float, repeated, tag = "1")]
    pub value: Vec<f32>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Int64List {
    #[prost(int64, repeated, tag = "1")]
    pub value: Vec<i64>,
}

impl Feature {
    pub fn int64(value: i64) -> Self {
        Self::int64_list(vec![value])
    }

    pub fn int64_list(value: Vec<i64>) -> Self {
        Self {
            kind: Some(feature::Kind::Int64List(Int64List { value })),
        }
    }

    pub fn float_list(value: Vec<f32>) -> Self {
        Self {
            kind: Some(feature::Kind::FloatList(FloatList { value })),
        }
    }

    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self::bytes_list(vec![value.into()])
    }

    pub fn bytes_list(value: Vec<Vec<u8>>) -> Self {
        Self {
            kind: Some(feature::Kind::BytesList(BytesList { value })),
        }
    }

    pub fn as_int64_list(&self) -> Option<&[i64]> {
        match &self.kind {
            Some(feature::Kind::Int64List(list)) => Some(&list.value),
            _ => None,
        }
    }

    pub fn as_float_list(&self) -> Option<&[f32]> {
        match &self.kind {
            Some(feature::Kind::FloatList(list)) => Some(&list.value),
            _ => None,
        }
    }

    pub fn as_bytes_list(&self) -> Option<&[Vec<u8>]> {
        match &self.kind {
            Some(feature::Kind::BytesList(list)) => Some(&list.value),
            _ => None,
        }
    }
}

impl Example {
    pub fn from_features(feature: BTreeMap<String, Feature>) -> Self {
        Self {
            features: Some(Features { feature }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Feature> {
        self.features.as_ref()?.feature.get(key)
    }

    /// First value of an int64 feature.
    pub fn int64(&self, key: &str) -> Option<i64> {
        self.get(key)?.as_int64_list()?.first().copied()
    }

    /// All values of a float feature.
    pub fn floats(&self, key: &str) -> Option<&[f32]> {
        self.get(key)?.as_float_list()
    }

    /// First value of a bytes feature.
    pub fn bytes(&self, key: &str) -> Option<&[u8]> {
        self.get(key)?.as_bytes_list()?.first().map(Vec::as_slice)
    }

    /// First value of a bytes feature, as UTF-8 text.
    pub fn text(&self, key: &str) -> Option<&str> {
        std::str::from_utf8(self.bytes(key)?).ok()
    }
}

/// Builds the Example written for one transcoded image.
pub fn image_example(record: &ImageRecord<'_>) -> Example {
    let mut xmin = Vec::with_capacity(record.boxes.len());
    let mut ymin = Vec::with_capacity(record.boxes.len());
    let mut xmax = Vec::with_capacity(record.boxes.len());
    let mut ymax = Vec::with_capacity(record.boxes.len());
    for bbox in record.boxes {
        xmin.push(bbox.xmin);
        ymin.push(bbox.ymin);
        xmax.push(bbox.xmax);
        ymax.push(bbox.ymax);
    }

    let features: [(&str, Feature); 16] = [
        (keys::HEIGHT, Feature::int64(i64::from(record.height))),
        (keys::WIDTH, Feature::int64(i64::from(record.width))),
        (keys::COLORSPACE, Feature::bytes(COLORSPACE)),
        (keys::CHANNELS, Feature::int64(CHANNELS)),
        (keys::CLASS_LABEL, Feature::int64(record.label)),
        (keys::CLASS_TEXT, Feature::bytes(record.text)),
        (
            keys::OBJECT_CLASS_LABEL,
            Feature::int64_list(vec![OBJECT_CLASS_LABEL]),
        ),
        (
            keys::OBJECT_CLASS_TEXT,
            Feature::bytes_list(vec![OBJECT_CLASS_TEXT.as_bytes().to_vec()]),
        ),
        (keys::BBOX_XMIN, Feature::float_list(xmin)),
        (keys::BBOX_XMAX, Feature::float_list(xmax)),
        (keys::BBOX_YMIN, Feature::float_list(ymin)),
        (keys::BBOX_YMAX, Feature::float_list(ymax)),
        (keys::FORMAT, Feature::bytes(IMAGE_FORMAT)),
        (keys::FILENAME, Feature::bytes(record.filename)),
        (keys::SOURCE_ID, Feature::bytes(record.filename)),
        (keys::ENCODED, Feature::bytes(record.encoded.as_slice())),
    ];

    Example::from_features(
        features
            .into_iter()
            .map(|(key, feature)| (key.to_string(), feature))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::BBox;
    use prost::Message;

    fn sample_record(boxes: &[BBox]) -> ImageRecord<'_> {
        ImageRecord {
            filename: "Black_Footed_Albatross_0046_18.jpg",
            text: "001.Black_footed_Albatross",
            label: 1,
            boxes,
            encoded: vec![0xff, 0xd8, 0xff, 0xd9],
            height: 240,
            width: 320,
        }
    }

    #[test]
    fn example_carries_every_image_feature() {
        let boxes = [
            BBox::from_xyxy(1.0, 2.0, 3.0, 4.0),
            BBox::from_xyxy(5.0, 6.0, 7.0, 8.0),
        ];
        let example = image_example(&sample_record(&boxes));

        assert_eq!(example.int64(keys::HEIGHT), Some(240));
        assert_eq!(example.int64(keys::WIDTH), Some(320));
        assert_eq!(example.int64(keys::CHANNELS), Some(3));
        assert_eq!(example.int64(keys::CLASS_LABEL), Some(1));
        assert_eq!(example.text(keys::COLORSPACE), Some("RGB"));
        assert_eq!(example.text(keys::FORMAT), Some("JPEG"));
        assert_eq!(
            example.text(keys::CLASS_TEXT),
            Some("001.Black_footed_Albatross")
        );
        assert_eq!(
            example.text(keys::FILENAME),
            example.text(keys::SOURCE_ID)
        );
        assert_eq!(example.int64(keys::OBJECT_CLASS_LABEL), Some(1));
        assert_eq!(example.text(keys::OBJECT_CLASS_TEXT), Some("bird"));
        assert_eq!(example.floats(keys::BBOX_XMIN), Some(&[1.0, 5.0][..]));
        assert_eq!(example.floats(keys::BBOX_YMIN), Some(&[2.0, 6.0][..]));
        assert_eq!(example.floats(keys::BBOX_XMAX), Some(&[3.0, 7.0][..]));
        assert_eq!(example.floats(keys::BBOX_YMAX), Some(&[4.0, 8.0][..]));
        assert_eq!(
            example.bytes(keys::ENCODED),
            Some(&[0xff, 0xd8, 0xff, 0xd9][..])
        );
    }

    #[test]
    fn image_without_boxes_gets_empty_box_lists() {
        let example = image_example(&sample_record(&[]));
        assert_eq!(example.floats(keys::BBOX_XMIN), Some(&[][..]));
        assert_eq!(example.int64(keys::OBJECT_CLASS_LABEL), Some(1));
    }

    #[test]
    fn serialization_is_deterministic_and_decodable() {
        let boxes = [BBox::from_xyxy(0.1, 0.2, 0.3, 0.4)];
        let example = image_example(&sample_record(&boxes));

        let first = example.encode_to_vec();
        let second = image_example(&sample_record(&boxes)).encode_to_vec();
        assert_eq!(first, second);

        let decoded = Example::decode(first.as_slice()).expect("decode");
        assert_eq!(decoded, example);
    }

    #[test]
    fn accessors_reject_mismatched_kinds() {
        let example = image_example(&sample_record(&[]));
        assert_eq!(example.int64(keys::FORMAT), None);
        assert_eq!(example.bytes(keys::HEIGHT), None);
        assert_eq!(example.int64("image/missing"), None);
    }
}
