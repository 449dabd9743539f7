/*
 * Test utilities for Busmap
 *
 * Builders for synthetic sysfs trees laid out the way the kernel exposes
 * DRM connectors, their DDC buses and DisplayPort AUX channels.
 */

#[cfg(test)]
pub mod test_utils {
    use crate::edid::tests::sample_edid;
    use crate::sysfs::Sysfs;
    use std::fs;
    use std::os::unix::fs::symlink;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    pub const INTEL_IGPU: &str = "sys/devices/pci0000:00/0000:00:02.0";
    pub const AMD_DGPU: &str = "sys/devices/pci0000:00/0000:00:01.0/0000:01:00.0";

    /// A sysfs tree rooted in a temporary directory
    pub struct SysfsFixture {
        pub temp_dir: TempDir,
    }

    impl SysfsFixture {
        pub fn new() -> Self {
            let temp_dir = TempDir::new().unwrap();
            fs::create_dir_all(temp_dir.path().join("sys/bus/i2c/devices")).unwrap();
            Self { temp_dir }
        }

        pub fn root(&self) -> &Path {
            self.temp_dir.path()
        }

        pub fn sysfs(&self) -> Sysfs {
            Sysfs::new(self.root())
        }

        pub fn dir(&self, rel: &str) -> PathBuf {
            let path = self.root().join(rel);
            fs::create_dir_all(&path).unwrap();
            path
        }

        pub fn attr(&self, rel: &str, value: impl AsRef<[u8]>) {
            let path = self.root().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, value).unwrap();
        }

        /// Symlink `rel` -> `target_rel`, both relative to the root
        pub fn link(&self, rel: &str, target_rel: &str) {
            let path = self.root().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            symlink(self.root().join(target_rel), path).unwrap();
        }

        /// PCI function with a bound driver and the given class code
        pub fn controller(&self, rel: &str, class: &str, driver: &str) {
            self.dir(rel);
            self.attr(&format!("{}/class", rel), format!("{}\n", class));
            self.attr(&format!("{}/vendor", rel), "0x8086\n");
            self.attr(&format!("{}/device", rel), "0x3e92\n");
            self.attr(&format!("{}/boot_vga", rel), "1\n");
            let driver_rel = format!("sys/bus/pci/drivers/{}", driver);
            self.dir(&driver_rel);
            self.link(&format!("{}/driver", rel), &driver_rel);
        }

        /// Adapter node `i2c-<busno>` under `parent_rel`, linked from /sys/bus/i2c/devices
        pub fn bus_node(&self, parent_rel: &str, busno: u32, name: &str) -> String {
            let node_rel = format!("{}/i2c-{}", parent_rel, busno);
            self.attr(&format!("{}/name", node_rel), format!("{}\n", name));
            let dev_rel = format!("{}/i2c-dev/i2c-{}", node_rel, busno);
            self.attr(&format!("{}/name", dev_rel), format!("{}\n", name));
            self.attr(&format!("{}/dev", dev_rel), format!("89:{}\n", busno));
            self.link(&format!("sys/bus/i2c/devices/i2c-{}", busno), &node_rel);
            node_rel
        }

        /// Connector node with EDID and state attributes
        pub fn connector(&self, controller_rel: &str, card: &str, connector: &str) -> String {
            let conn_rel = format!("{}/drm/{}/{}", controller_rel, card, connector);
            self.dir(&conn_rel);
            self.attr(&format!("{}/edid", conn_rel), sample_edid("TEST MONITOR", "SN0001"));
            self.attr(&format!("{}/enabled", conn_rel), "enabled\n");
            self.attr(&format!("{}/status", conn_rel), "connected\n");
            conn_rel
        }

        /// DisplayPort connector owning bus `busno` through its AUX channel
        pub fn dp_connector(&self, controller_rel: &str, card: &str, connector: &str, busno: u32) -> String {
            let conn_rel = self.connector(controller_rel, card, connector);
            self.attr(&format!("{}/drm_dp_aux0/name", conn_rel), "AUX B/DDI B/PHY B\n");
            self.attr(&format!("{}/drm_dp_aux0/dev", conn_rel), "237:0\n");
            let bus_rel = self.bus_node(&conn_rel, busno, "AUX B/DDI B/PHY B");
            self.link(&format!("{}/ddc", conn_rel), &bus_rel);
            conn_rel
        }

        /// Non-DisplayPort connector whose `ddc` link points at `bus_rel`
        pub fn ddc_connector(&self, controller_rel: &str, card: &str, connector: &str, bus_rel: &str) -> String {
            let conn_rel = self.connector(controller_rel, card, connector);
            self.link(&format!("{}/ddc", conn_rel), bus_rel);
            conn_rel
        }

        /// Intel iGPU with DP-1 driving bus 13
        pub fn intel_dp_tree(&self) {
            self.controller(INTEL_IGPU, "0x030000", "i915");
            self.dp_connector(INTEL_IGPU, "card0", "card0-DP-1", 13);
        }

        /// AMD card with HDMI-A-1 on bus 5 and DVI-D-1 on bus 6
        pub fn amd_hdmi_tree(&self) {
            self.controller(AMD_DGPU, "0x030000", "amdgpu");
            let bus5 = self.bus_node(AMD_DGPU, 5, "AMDGPU DM i2c hw bus 0");
            let bus6 = self.bus_node(AMD_DGPU, 6, "AMDGPU DM i2c hw bus 1");
            self.dir(&format!("{}/drm/renderD128", AMD_DGPU));
            self.ddc_connector(AMD_DGPU, "card1", "card1-HDMI-A-1", &bus5);
            self.ddc_connector(AMD_DGPU, "card1", "card1-DVI-D-1", &bus6);
        }
    }

    /// Canonical form of `rel` as the kernel would name it
    pub fn kernel(rel: &str) -> PathBuf {
        Path::new("/").join(rel)
    }
}

#[cfg(test)]
mod tests {
    use super::test_utils::*;
    use std::fs;

    #[test]
    fn test_fixture_bus_link_resolves() {
        let fixture = SysfsFixture::new();
        fixture.intel_dp_tree();
        let link = fixture.root().join("sys/bus/i2c/devices/i2c-13");
        let real = fs::canonicalize(&link).unwrap();
        assert!(real.ends_with("drm/card0/card0-DP-1/i2c-13"));
        assert!(real.join("i2c-dev/i2c-13/dev").exists());
    }

    #[test]
    fn test_fixture_ddc_link_resolves() {
        let fixture = SysfsFixture::new();
        fixture.amd_hdmi_tree();
        let ddc = fixture
            .root()
            .join(AMD_DGPU)
            .join("drm/card1/card1-HDMI-A-1/ddc/i2c-dev/i2c-5");
        assert!(ddc.is_dir());
    }

    #[test]
    fn test_kernel_path() {
        assert_eq!(kernel(INTEL_IGPU).to_str(), Some("/sys/devices/pci0000:00/0000:00:02.0"));
    }
}
